//! Discount Strategies
//!
//! The monetary effect of a promotion once its condition holds. Each strategy
//! works on the whole cart and is independent of any other promotion's effect.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::{
    cart::Cart, discounts::DiscountBreakdown, promotions::Promotion, uuids::VariantUuid,
};

pub mod bogo;
pub mod bundle;
pub mod buy_x_get_y;
pub mod fixed_amount;
pub mod params;
pub mod percentage_off;
pub mod tiered;

#[cfg(test)]
pub(crate) mod test_support;

pub use bundle::Bundle;
pub use buy_x_get_y::BuyXGetY;
pub use fixed_amount::FixedAmount;
pub use params::{StrategyError, StrategyParams};
pub use percentage_off::PercentageOff;
pub use tiered::{Tier, Tiered};

/// The known strategy types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    /// Percentage of the subtotal.
    PercentageOff,

    /// Fixed amount, capped at the subtotal.
    FixedAmount,

    /// Waive shipping.
    FreeShipping,

    /// Cheapest line's unit price.
    Bogo,

    /// Discount the cheapest lines that meet a quantity.
    BuyXGetY,

    /// Percentage by spend tier.
    Tiered,

    /// Fixed price for the whole cart.
    Bundle,
}

impl StrategyType {
    /// Return the stored name of the strategy type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PercentageOff => "percentage_off",
            Self::FixedAmount => "fixed_amount",
            Self::FreeShipping => "free_shipping",
            Self::Bogo => "bogo",
            Self::BuyXGetY => "buy_x_get_y",
            Self::Tiered => "tiered",
            Self::Bundle => "bundle",
        }
    }
}

impl Display for StrategyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyType {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage_off" => Ok(Self::PercentageOff),
            "fixed_amount" => Ok(Self::FixedAmount),
            "free_shipping" => Ok(Self::FreeShipping),
            "bogo" => Ok(Self::Bogo),
            "buy_x_get_y" => Ok(Self::BuyXGetY),
            "tiered" => Ok(Self::Tiered),
            "bundle" => Ok(Self::Bundle),
            other => Err(StrategyError::UnknownType(other.to_string())),
        }
    }
}

/// The effect a strategy computes against a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyOutcome {
    /// Amount taken off the cart.
    pub discount_amount: Decimal,

    /// Whether shipping is waived.
    pub free_shipping: bool,

    /// Variants the discount was computed against.
    pub affected_items: Vec<VariantUuid>,
}

impl StrategyOutcome {
    /// No effect at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// A monetary discount against the given variants.
    pub const fn discount(discount_amount: Decimal, affected_items: Vec<VariantUuid>) -> Self {
        Self {
            discount_amount,
            free_shipping: false,
            affected_items,
        }
    }

    /// Waived shipping with no monetary discount.
    pub fn free_shipping() -> Self {
        Self {
            free_shipping: true,
            ..Self::default()
        }
    }

    /// Whether the outcome has no monetary or shipping effect.
    pub fn is_empty(&self) -> bool {
        self.discount_amount.is_zero() && !self.free_shipping
    }

    /// Clamp the discount into `[0, subtotal]`.
    #[must_use]
    fn clamped(mut self, subtotal: Decimal) -> Self {
        self.discount_amount = self
            .discount_amount
            .clamp(Decimal::ZERO, subtotal.max(Decimal::ZERO));
        self
    }
}

/// A promotion's discount strategy with validated parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Percentage off the subtotal.
    PercentageOff(PercentageOff),

    /// Fixed amount off the subtotal.
    FixedAmount(FixedAmount),

    /// Free shipping.
    FreeShipping,

    /// Buy one get one.
    Bogo,

    /// Buy X get Y.
    BuyXGetY(BuyXGetY),

    /// Tiered spend.
    Tiered(Tiered),

    /// Fixed bundle price.
    Bundle(Bundle),

    /// A stored strategy that could not be loaded. Always computes nothing.
    Inert {
        /// The strategy type as stored.
        strategy_type: String,
    },
}

impl Strategy {
    /// Parse a stored strategy type and its parameter bag.
    ///
    /// # Errors
    ///
    /// Returns a [`StrategyError`] if the type is unknown or the parameters
    /// are missing, malformed or out of range.
    pub fn parse(strategy_type: &str, params: &StrategyParams) -> Result<Self, StrategyError> {
        Ok(match strategy_type.parse::<StrategyType>()? {
            StrategyType::PercentageOff => Self::PercentageOff(PercentageOff::from_params(params)?),
            StrategyType::FixedAmount => Self::FixedAmount(FixedAmount::from_params(params)?),
            StrategyType::FreeShipping => Self::FreeShipping,
            StrategyType::Bogo => Self::Bogo,
            StrategyType::BuyXGetY => Self::BuyXGetY(BuyXGetY::from_params(params)?),
            StrategyType::Tiered => Self::Tiered(Tiered::from_params(params)?),
            StrategyType::Bundle => Self::Bundle(Bundle::from_params(params)?),
        })
    }

    /// Return the known strategy type, if this strategy loaded.
    pub const fn strategy_type(&self) -> Option<StrategyType> {
        match self {
            Self::PercentageOff(_) => Some(StrategyType::PercentageOff),
            Self::FixedAmount(_) => Some(StrategyType::FixedAmount),
            Self::FreeShipping => Some(StrategyType::FreeShipping),
            Self::Bogo => Some(StrategyType::Bogo),
            Self::BuyXGetY(_) => Some(StrategyType::BuyXGetY),
            Self::Tiered(_) => Some(StrategyType::Tiered),
            Self::Bundle(_) => Some(StrategyType::Bundle),
            Self::Inert { .. } => None,
        }
    }

    /// Return the stored name of the strategy.
    pub fn type_as_str(&self) -> &str {
        match self {
            Self::Inert { strategy_type } => strategy_type,
            other => other
                .strategy_type()
                .map_or("unknown", StrategyType::as_str),
        }
    }

    /// Compute this strategy's effect on the cart.
    ///
    /// Never fails: a calculation error degrades to no effect. The discount is
    /// always within `[0, subtotal]`.
    pub fn apply(&self, cart: &Cart) -> StrategyOutcome {
        let outcome = match self {
            Self::PercentageOff(strategy) => strategy.calculate(cart),
            Self::FixedAmount(strategy) => Ok(strategy.calculate(cart)),
            Self::FreeShipping => Ok(StrategyOutcome::free_shipping()),
            Self::Bogo => Ok(bogo::calculate(cart)),
            Self::BuyXGetY(strategy) => strategy.calculate(cart),
            Self::Tiered(strategy) => strategy.calculate(cart),
            Self::Bundle(strategy) => Ok(strategy.calculate(cart)),
            Self::Inert { .. } => Ok(StrategyOutcome::none()),
        };

        match outcome {
            Ok(outcome) => outcome.clamped(cart.subtotal()),
            Err(error) => {
                warn!(
                    strategy_type = self.type_as_str(),
                    %error,
                    "strategy calculation failed, treating as no discount"
                );

                StrategyOutcome::none()
            }
        }
    }
}

/// Compute a promotion's discount line item against the cart.
pub fn apply(promotion: &Promotion, cart: &Cart) -> DiscountBreakdown {
    let outcome = promotion.strategy().apply(cart);

    DiscountBreakdown {
        promotion_id: promotion.id(),
        promotion_name: promotion.name().to_string(),
        strategy_type: promotion.strategy().type_as_str().to_string(),
        discount_amount: outcome.discount_amount,
        free_shipping: outcome.free_shipping,
        affected_items: outcome.affected_items,
    }
}
