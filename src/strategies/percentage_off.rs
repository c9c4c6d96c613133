//! Percentage Off
//!
//! A percentage of the whole cart subtotal.

use decimal_percentage::Percentage;

use crate::{
    cart::Cart,
    discounts::{DiscountError, percent_of},
    strategies::{
        StrategyOutcome, StrategyType,
        params::{ParamReader, StrategyError, StrategyParams},
    },
};

/// Percentage off the cart subtotal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentageOff {
    percent: Percentage,
}

impl PercentageOff {
    /// Create a new percentage-off strategy.
    pub const fn new(percent: Percentage) -> Self {
        Self { percent }
    }

    /// Read parameters: `percentage` (0–100).
    ///
    /// # Errors
    ///
    /// Returns a [`StrategyError`] if `percentage` is missing, malformed or out of range.
    pub fn from_params(params: &StrategyParams) -> Result<Self, StrategyError> {
        let reader = ParamReader::new(StrategyType::PercentageOff, params);

        Ok(Self::new(reader.percent("percentage")?))
    }

    /// Return the percentage.
    pub const fn percent(&self) -> &Percentage {
        &self.percent
    }

    /// Calculate the discount: `round(subtotal × percent)`, affecting every line.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the percentage calculation overflows.
    pub fn calculate(&self, cart: &Cart) -> Result<StrategyOutcome, DiscountError> {
        let amount = percent_of(&self.percent, cart.subtotal())?;

        Ok(StrategyOutcome::discount(amount, cart.variant_ids()))
    }
}
