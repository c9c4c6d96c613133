//! Bundle
//!
//! The whole cart is sold for a fixed bundle price.

use rust_decimal::Decimal;

use crate::{
    cart::Cart,
    strategies::{
        StrategyOutcome, StrategyType,
        params::{ParamReader, StrategyError, StrategyParams},
    },
};

/// Fixed bundle price for the whole cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bundle {
    bundle_price: Decimal,
}

impl Bundle {
    /// Create a new bundle strategy.
    pub const fn new(bundle_price: Decimal) -> Self {
        Self { bundle_price }
    }

    /// Read parameters: `bundlePrice` (non-negative).
    ///
    /// # Errors
    ///
    /// Returns a [`StrategyError`] if `bundlePrice` is missing, malformed or negative.
    pub fn from_params(params: &StrategyParams) -> Result<Self, StrategyError> {
        let reader = ParamReader::new(StrategyType::Bundle, params);

        Ok(Self::new(reader.money("bundlePrice")?))
    }

    /// Return the bundle price.
    pub const fn bundle_price(&self) -> Decimal {
        self.bundle_price
    }

    /// Calculate the discount: `max(0, subtotal − bundle_price)`.
    pub fn calculate(&self, cart: &Cart) -> StrategyOutcome {
        let amount = (cart.subtotal() - self.bundle_price).max(Decimal::ZERO);

        StrategyOutcome::discount(amount, cart.variant_ids())
    }
}
