//! Evaluation Context
//!
//! Customer facts resolved by the caller before a pricing pass. The engine
//! reads these verbatim and never looks anything up itself.

use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::{
    segments::membership::{MembershipError, MembershipStore},
    uuids::{CustomerUuid, SegmentUuid, TenantUuid},
};

/// Evaluation context supplied alongside a cart snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EvaluationContext {
    /// Whether the customer has never completed an order.
    #[serde(default)]
    pub is_first_purchase: bool,

    /// Precomputed segment memberships for the customer.
    #[serde(default)]
    pub customer_segment_ids: FxHashSet<SegmentUuid>,
}

impl EvaluationContext {
    /// Create a context from explicit facts.
    pub fn new(
        is_first_purchase: bool,
        customer_segment_ids: impl IntoIterator<Item = SegmentUuid>,
    ) -> Self {
        Self {
            is_first_purchase,
            customer_segment_ids: customer_segment_ids.into_iter().collect(),
        }
    }

    /// Context for a customer placing their first order, with no segments.
    pub fn first_purchase() -> Self {
        Self {
            is_first_purchase: true,
            customer_segment_ids: FxHashSet::default(),
        }
    }

    /// Replace the segment memberships.
    #[must_use]
    pub fn with_segments(mut self, segments: impl IntoIterator<Item = SegmentUuid>) -> Self {
        self.customer_segment_ids = segments.into_iter().collect();
        self
    }

    /// Check whether the customer belongs to the given segment.
    pub fn in_segment(&self, segment: SegmentUuid) -> bool {
        self.customer_segment_ids.contains(&segment)
    }

    /// Build a context from materialized segment membership.
    ///
    /// Anonymous carts (no customer) belong to no segments.
    ///
    /// # Errors
    ///
    /// Returns a [`MembershipError`] if the membership store cannot be read.
    pub async fn from_memberships<S>(
        store: &S,
        tenant: TenantUuid,
        customer: Option<CustomerUuid>,
        is_first_purchase: bool,
    ) -> Result<Self, MembershipError>
    where
        S: MembershipStore + ?Sized,
    {
        let customer_segment_ids = match customer {
            Some(customer) => store.segments_for_customer(tenant, customer).await?,
            None => FxHashSet::default(),
        };

        Ok(Self {
            is_first_purchase,
            customer_segment_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_segment_checks_membership() {
        let vip = SegmentUuid::new();
        let context = EvaluationContext::default().with_segments([vip]);

        assert!(context.in_segment(vip));
        assert!(!context.in_segment(SegmentUuid::new()));
        assert!(!context.is_first_purchase);
    }

    #[test]
    fn first_purchase_has_no_segments() {
        let context = EvaluationContext::first_purchase();

        assert!(context.is_first_purchase);
        assert!(context.customer_segment_ids.is_empty());
    }
}
