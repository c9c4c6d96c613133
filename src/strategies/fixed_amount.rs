//! Fixed Amount
//!
//! A fixed amount off the cart, never more than the subtotal.

use rust_decimal::Decimal;

use crate::{
    cart::Cart,
    strategies::{
        StrategyOutcome, StrategyType,
        params::{ParamReader, StrategyError, StrategyParams},
    },
};

/// Fixed amount off the cart subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAmount {
    amount: Decimal,
}

impl FixedAmount {
    /// Create a new fixed-amount strategy.
    pub const fn new(amount: Decimal) -> Self {
        Self { amount }
    }

    /// Read parameters: `amount` (non-negative).
    ///
    /// # Errors
    ///
    /// Returns a [`StrategyError`] if `amount` is missing, malformed or negative.
    pub fn from_params(params: &StrategyParams) -> Result<Self, StrategyError> {
        let reader = ParamReader::new(StrategyType::FixedAmount, params);

        Ok(Self::new(reader.money("amount")?))
    }

    /// Return the configured amount.
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Calculate the discount: `min(amount, subtotal)`.
    pub fn calculate(&self, cart: &Cart) -> StrategyOutcome {
        StrategyOutcome::discount(self.amount.min(cart.subtotal()), cart.variant_ids())
    }
}
