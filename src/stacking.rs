//! Stacking
//!
//! Resolves which of a tenant's candidate promotions apply to a cart in a
//! single pass. Candidates must arrive sorted ascending by priority; the first
//! non-stackable promotion to produce an effect excludes every later
//! non-stackable one. Stackable promotions never block and are never blocked.
//!
//! Every accepted discount is computed against the full, undiscounted cart.
//! There is no search for the combination with the largest total.

use std::fmt::{Display, Formatter, Result as FmtResult};

use tracing::{Span, debug};

use crate::{
    cart::Cart, context::EvaluationContext, discounts::DiscountBreakdown, promotions::Promotion,
};

/// Why a candidate promotion was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Its usage limit has been reached.
    UsageExhausted,

    /// Its condition tree does not hold for the cart.
    ConditionUnmet,

    /// Its strategy computed no discount and no free shipping.
    NoEffect,

    /// A non-stackable promotion was already accepted.
    ExclusiveAlreadyApplied,
}

impl SkipReason {
    /// Return a short name for logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UsageExhausted => "usage_exhausted",
            Self::ConditionUnmet => "condition_unmet",
            Self::NoEffect => "no_effect",
            Self::ExclusiveAlreadyApplied => "exclusive_already_applied",
        }
    }
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Accumulator threaded through the resolver pass.
#[derive(Debug, Default)]
struct StackingState {
    exclusive_applied: bool,
    candidates: usize,
    accepted: Vec<DiscountBreakdown>,
}

impl StackingState {
    fn consider(
        mut self,
        promotion: &Promotion,
        cart: &Cart,
        context: &EvaluationContext,
    ) -> Self {
        self.candidates += 1;

        match self.check(promotion, cart, context) {
            Ok(breakdown) => {
                debug!(
                    promotion_id = %promotion.id(),
                    discount_amount = %breakdown.discount_amount,
                    free_shipping = breakdown.free_shipping,
                    stackable = promotion.is_stackable(),
                    "accepted promotion"
                );

                self.exclusive_applied |= !promotion.is_stackable();
                self.accepted.push(breakdown);
            }
            Err(reason) => {
                debug!(
                    promotion_id = %promotion.id(),
                    reason = %reason,
                    "skipped promotion"
                );
            }
        }

        self
    }

    fn check(
        &self,
        promotion: &Promotion,
        cart: &Cart,
        context: &EvaluationContext,
    ) -> Result<DiscountBreakdown, SkipReason> {
        if promotion.usage().is_exhausted() {
            return Err(SkipReason::UsageExhausted);
        }

        if !promotion.qualifies(cart, context) {
            return Err(SkipReason::ConditionUnmet);
        }

        let breakdown = promotion.apply(cart);

        if breakdown.is_empty() {
            return Err(SkipReason::NoEffect);
        }

        if self.exclusive_applied && !promotion.is_stackable() {
            return Err(SkipReason::ExclusiveAlreadyApplied);
        }

        Ok(breakdown)
    }
}

/// Resolve the discounts that apply to a cart, in candidate order.
///
/// `promotions` must already be filtered to the tenant's active promotions and
/// sorted ascending by priority; this function does not reorder them.
#[tracing::instrument(
    name = "promotions.stacking.resolve",
    skip_all,
    fields(
        subtotal = %cart.subtotal(),
        candidates = tracing::field::Empty,
        accepted = tracing::field::Empty
    )
)]
pub fn resolve<'a, I>(
    promotions: I,
    cart: &Cart,
    context: &EvaluationContext,
) -> Vec<DiscountBreakdown>
where
    I: IntoIterator<Item = &'a Promotion>,
{
    let state = promotions
        .into_iter()
        .fold(StackingState::default(), |state, promotion| {
            state.consider(promotion, cart, context)
        });

    let span = Span::current();

    span.record("candidates", state.candidates);
    span.record("accepted", state.accepted.len());

    state.accepted
}
