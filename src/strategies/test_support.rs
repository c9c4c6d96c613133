//! Shared helpers for strategy tests.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::{
    cart::{Cart, CartError, CartLine},
    strategies::StrategyParams,
    uuids::{ProductUuid, VariantUuid},
};

/// Build a cart with one line per `(quantity, unit_price)`, each a distinct product.
pub(crate) fn cart_of(lines: &[(u32, Decimal)]) -> Result<Cart, CartError> {
    let lines: Vec<CartLine> = lines
        .iter()
        .map(|&(quantity, unit_price)| {
            CartLine::new(
                VariantUuid::new(),
                ProductUuid::new(),
                [],
                quantity,
                unit_price,
            )
        })
        .collect();

    Cart::with_lines(lines, None)
}

/// Unwrap a JSON object literal into a parameter bag.
pub(crate) fn params(value: Value) -> StrategyParams {
    match value {
        Value::Object(map) => map,
        _ => StrategyParams::new(),
    }
}
