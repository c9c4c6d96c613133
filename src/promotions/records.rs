//! Promotion Records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    conditions::ConditionNode,
    promotions::{Promotion, PromotionKind, PromotionStatus, Schedule, UsageBudget},
    strategies::{Strategy, StrategyError, StrategyParams},
    uuids::{PromotionUuid, TenantUuid},
};

/// Promotion as stored, with the strategy parameters still untyped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionRecord {
    /// Promotion id; minted when absent.
    #[serde(default)]
    pub id: PromotionUuid,

    /// Owning tenant.
    pub tenant_id: TenantUuid,

    /// Display name.
    pub name: String,

    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,

    /// Coupon, automatic or flash sale.
    #[serde(rename = "type", default)]
    pub kind: PromotionKind,

    /// Lifecycle status.
    #[serde(default)]
    pub status: PromotionStatus,

    /// Evaluation order, lowest first.
    #[serde(default)]
    pub priority: i32,

    /// Whether the promotion combines with others.
    #[serde(default)]
    pub stackable: bool,

    /// Stored strategy name.
    pub strategy_type: String,

    /// Untyped strategy parameters.
    #[serde(default)]
    pub strategy_params: StrategyParams,

    /// Condition gating the promotion; always true when absent.
    #[serde(default)]
    pub condition: ConditionNode,

    /// Start of the active window.
    #[serde(default)]
    pub starts_at: Option<Timestamp>,

    /// End of the active window.
    #[serde(default)]
    pub ends_at: Option<Timestamp>,

    /// Maximum redemptions.
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Redemptions so far.
    #[serde(default)]
    pub usage_count: u32,
}

impl PromotionRecord {
    /// Load the record, treating unusable strategy parameters as an inert
    /// strategy rather than an error.
    pub fn into_promotion(self) -> Promotion {
        let strategy = match Strategy::parse(&self.strategy_type, &self.strategy_params) {
            Ok(strategy) => strategy,
            Err(error) => {
                warn!(
                    promotion_id = %self.id,
                    strategy_type = %self.strategy_type,
                    %error,
                    "promotion has unusable strategy parameters, it will have no effect"
                );

                Strategy::Inert {
                    strategy_type: self.strategy_type.clone(),
                }
            }
        };

        self.build(strategy)
    }

    fn build(self, strategy: Strategy) -> Promotion {
        let mut promotion = Promotion::new(self.tenant_id, self.name, strategy)
            .with_id(self.id)
            .with_kind(self.kind)
            .with_status(self.status)
            .with_priority(self.priority)
            .with_stackable(self.stackable)
            .with_condition(self.condition)
            .with_schedule(Schedule {
                starts_at: self.starts_at,
                ends_at: self.ends_at,
            })
            .with_usage(UsageBudget {
                limit: self.usage_limit,
                count: self.usage_count,
            });

        if let Some(description) = self.description {
            promotion = promotion.with_description(description);
        }

        promotion
    }
}

impl TryFrom<PromotionRecord> for Promotion {
    type Error = StrategyError;

    fn try_from(record: PromotionRecord) -> Result<Self, Self::Error> {
        let strategy = Strategy::parse(&record.strategy_type, &record.strategy_params)?;

        Ok(record.build(strategy))
    }
}
