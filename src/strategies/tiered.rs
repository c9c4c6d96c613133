//! Tiered
//!
//! Spend thresholds, each with a percentage off the whole subtotal. The
//! highest threshold the subtotal reaches wins.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::{
    cart::Cart,
    discounts::{DiscountError, percent_of},
    strategies::{
        StrategyOutcome, StrategyType,
        params::{ParamReader, StrategyError, StrategyParams},
    },
};

/// A single spend tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier {
    min: Decimal,
    percent: Percentage,
}

impl Tier {
    /// Create a new tier.
    pub const fn new(min: Decimal, percent: Percentage) -> Self {
        Self { min, percent }
    }

    /// Return the minimum subtotal for this tier.
    pub const fn min(&self) -> Decimal {
        self.min
    }

    /// Return the tier's percentage.
    pub const fn percent(&self) -> &Percentage {
        &self.percent
    }
}

/// Tiered spend strategy
#[derive(Debug, Clone, PartialEq)]
pub struct Tiered {
    tiers: SmallVec<[Tier; 4]>,
}

impl Tiered {
    /// Create a new tiered strategy.
    pub fn new(tiers: impl IntoIterator<Item = Tier>) -> Self {
        Self {
            tiers: tiers.into_iter().collect(),
        }
    }

    /// Read parameters: `tiers`, an array of `{min, percentage}`.
    ///
    /// # Errors
    ///
    /// Returns a [`StrategyError`] if `tiers` or any tier field is missing,
    /// malformed or out of range.
    pub fn from_params(params: &StrategyParams) -> Result<Self, StrategyError> {
        let reader = ParamReader::new(StrategyType::Tiered, params);

        let tiers = reader
            .objects("tiers")?
            .iter()
            .map(|tier| Ok(Tier::new(tier.money("min")?, tier.percent("percentage")?)))
            .collect::<Result<SmallVec<[Tier; 4]>, StrategyError>>()?;

        Ok(Self { tiers })
    }

    /// Return the tiers.
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Return the tier with the highest minimum the subtotal reaches.
    ///
    /// Among tiers sharing that minimum, the first listed wins.
    pub fn select(&self, subtotal: Decimal) -> Option<&Tier> {
        // max_by_key keeps the last maximum, so walk the tiers backwards
        self.tiers
            .iter()
            .rev()
            .filter(|tier| subtotal >= tier.min)
            .max_by_key(|tier| tier.min)
    }

    /// Calculate the discount: `round(subtotal × tier percent)`.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the percentage calculation overflows.
    pub fn calculate(&self, cart: &Cart) -> Result<StrategyOutcome, DiscountError> {
        let Some(tier) = self.select(cart.subtotal()) else {
            return Ok(StrategyOutcome::none());
        };

        let amount = percent_of(&tier.percent, cart.subtotal())?;

        Ok(StrategyOutcome::discount(amount, cart.variant_ids()))
    }
}
