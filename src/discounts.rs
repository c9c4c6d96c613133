//! Discounts
//!
//! Money rounding shared by every strategy, and the discount line items the
//! engine hands back to checkout.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;

use crate::uuids::{PromotionUuid, VariantUuid};

/// Decimal places kept on every monetary result.
pub const MONEY_DP: u32 = 2;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely represented.
    #[error("percentage calculation overflowed")]
    PercentConversion,

    /// Money arithmetic overflowed.
    #[error("money arithmetic overflowed")]
    Overflow,
}

/// Round a monetary amount to two decimal places, half away from zero.
///
/// Discount amounts are never negative, so this is round-half-up.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Calculate `percent` of `amount`, rounded with [`round_money`].
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the multiplication overflows.
pub fn percent_of(percent: &Percentage, amount: Decimal) -> Result<Decimal, DiscountError> {
    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(amount)
        .map(round_money)
        .ok_or(DiscountError::PercentConversion)
}

/// A single discount line item produced by an accepted promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountBreakdown {
    /// Promotion that produced this discount.
    pub promotion_id: PromotionUuid,

    /// Promotion display name.
    pub promotion_name: String,

    /// Name of the strategy that computed the discount.
    pub strategy_type: String,

    /// Amount taken off the cart, never negative.
    pub discount_amount: Decimal,

    /// Whether the promotion waives shipping.
    pub free_shipping: bool,

    /// Variants the discount was computed against.
    pub affected_items: Vec<VariantUuid>,
}

impl DiscountBreakdown {
    /// Whether the discount has no monetary or shipping effect.
    pub fn is_empty(&self) -> bool {
        self.discount_amount.is_zero() && !self.free_shipping
    }
}

/// Cart-level effect of a list of accepted discounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiscountTotals {
    /// Sum of all discount amounts.
    pub discount_amount: Decimal,

    /// Whether any discount waives shipping.
    pub free_shipping: bool,

    /// Number of promotions that contributed.
    pub applied_promotions: usize,
}

impl DiscountTotals {
    /// Fold accepted discounts into their cart-level effect.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::Overflow`] if the summed amounts cannot be
    /// represented.
    pub fn from_breakdowns(breakdowns: &[DiscountBreakdown]) -> Result<Self, DiscountError> {
        breakdowns
            .iter()
            .try_fold(Self::default(), |totals, breakdown| {
                Ok(Self {
                    discount_amount: totals
                        .discount_amount
                        .checked_add(breakdown.discount_amount)
                        .ok_or(DiscountError::Overflow)?,
                    free_shipping: totals.free_shipping || breakdown.free_shipping,
                    applied_promotions: totals.applied_promotions.saturating_add(1),
                })
            })
    }
}
