//! Promotion Catalog

use jiff::Timestamp;
use tracing::debug;

use crate::{
    promotions::{Promotion, PromotionRecord},
    uuids::TenantUuid,
};

/// Loaded promotions across tenants
#[derive(Debug, Clone, Default)]
pub struct PromotionCatalog {
    promotions: Vec<Promotion>,
}

impl PromotionCatalog {
    /// Create a catalog from loaded promotions.
    pub fn new(promotions: impl IntoIterator<Item = Promotion>) -> Self {
        Self {
            promotions: promotions.into_iter().collect(),
        }
    }

    /// Create a catalog from stored records, making unusable ones inert.
    pub fn from_records(records: impl IntoIterator<Item = PromotionRecord>) -> Self {
        Self::new(records.into_iter().map(PromotionRecord::into_promotion))
    }

    /// Add a promotion.
    pub fn insert(&mut self, promotion: Promotion) {
        self.promotions.push(promotion);
    }

    /// Return every promotion in load order.
    pub fn promotions(&self) -> &[Promotion] {
        &self.promotions
    }

    /// Number of loaded promotions.
    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }

    /// Promotions eligible for the tenant at `now`, ascending by priority.
    ///
    /// Ties keep load order.
    pub fn active_for(&self, tenant: TenantUuid, now: Timestamp) -> Vec<&Promotion> {
        let mut active: Vec<&Promotion> = self
            .promotions
            .iter()
            .filter(|promotion| promotion.tenant() == tenant && promotion.is_eligible_at(now))
            .collect();

        active.sort_by_key(|promotion| promotion.priority());

        debug!(
            %tenant,
            loaded = self.promotions.len(),
            active = active.len(),
            "selected active promotions"
        );

        active
    }
}

impl FromIterator<Promotion> for PromotionCatalog {
    fn from_iter<I: IntoIterator<Item = Promotion>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::{
        promotions::{PromotionStatus, UsageBudget},
        strategies::{FixedAmount, Strategy},
    };

    use super::*;

    fn promotion(tenant: TenantUuid, name: &str, priority: i32) -> Promotion {
        Promotion::new(
            tenant,
            name,
            Strategy::FixedAmount(FixedAmount::new(dec!(1))),
        )
        .with_priority(priority)
    }

    fn names(promotions: &[&Promotion]) -> Vec<String> {
        promotions
            .iter()
            .map(|promotion| promotion.name().to_string())
            .collect()
    }

    #[test]
    fn active_for_sorts_by_priority_keeping_ties_stable() {
        let tenant = TenantUuid::new();
        let catalog: PromotionCatalog = [
            promotion(tenant, "c", 2),
            promotion(tenant, "a", 0),
            promotion(tenant, "b1", 1),
            promotion(tenant, "b2", 1),
        ]
        .into_iter()
        .collect();

        let active = catalog.active_for(tenant, Timestamp::now());

        assert_eq!(names(&active), ["a", "b1", "b2", "c"]);
    }

    #[test]
    fn active_for_filters_tenant_and_eligibility() {
        let tenant = TenantUuid::new();
        let mut catalog = PromotionCatalog::default();

        catalog.insert(promotion(tenant, "live", 0));
        catalog.insert(promotion(TenantUuid::new(), "other tenant", 0));
        catalog.insert(promotion(tenant, "disabled", 0).with_status(PromotionStatus::Disabled));
        catalog.insert(
            promotion(tenant, "used up", 0).with_usage(UsageBudget::with_limit(1).with_count(1)),
        );

        assert_eq!(catalog.len(), 4);
        assert_eq!(names(&catalog.active_for(tenant, Timestamp::now())), ["live"]);
    }

    #[test]
    fn empty_catalog_has_nothing_active() {
        let catalog = PromotionCatalog::default();

        assert!(catalog.is_empty());
        assert!(catalog.active_for(TenantUuid::new(), Timestamp::now()).is_empty());
    }
}
