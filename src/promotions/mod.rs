//! Promotions

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    cart::Cart,
    conditions::ConditionNode,
    context::EvaluationContext,
    discounts::DiscountBreakdown,
    strategies::{self, Strategy},
    uuids::{PromotionUuid, TenantUuid},
};

pub mod budget;
pub mod catalog;
pub mod records;
pub mod schedule;

pub use budget::UsageBudget;
pub use catalog::PromotionCatalog;
pub use records::PromotionRecord;
pub use schedule::Schedule;

/// How a promotion reaches the cart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionKind {
    /// Entered by the customer as a code
    Coupon,

    /// Applied automatically when its condition holds
    #[default]
    Automatic,

    /// Time-boxed automatic promotion
    FlashSale,
}

/// Administrative lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    /// Live
    #[default]
    Active,

    /// Created but not yet live
    Scheduled,

    /// Past its run
    Expired,

    /// Switched off
    Disabled,
}

/// A discount rule
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    id: PromotionUuid,
    tenant: TenantUuid,
    name: String,
    description: Option<String>,
    kind: PromotionKind,
    status: PromotionStatus,
    priority: i32,
    stackable: bool,
    strategy: Strategy,
    condition: ConditionNode,
    schedule: Schedule,
    usage: UsageBudget,
}

impl Promotion {
    /// Create an active, automatic, non-stackable promotion with no condition,
    /// no schedule and no usage limit.
    pub fn new(tenant: TenantUuid, name: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            id: PromotionUuid::new(),
            tenant,
            name: name.into(),
            description: None,
            kind: PromotionKind::default(),
            status: PromotionStatus::default(),
            priority: 0,
            stackable: false,
            strategy,
            condition: ConditionNode::always(),
            schedule: Schedule::always(),
            usage: UsageBudget::unlimited(),
        }
    }

    /// Set the id.
    #[must_use]
    pub const fn with_id(mut self, id: PromotionUuid) -> Self {
        self.id = id;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: PromotionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the status.
    #[must_use]
    pub const fn with_status(mut self, status: PromotionStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the priority. Lower is evaluated first.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set whether the promotion combines with non-stackable promotions.
    #[must_use]
    pub const fn with_stackable(mut self, stackable: bool) -> Self {
        self.stackable = stackable;
        self
    }

    /// Set the condition tree.
    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<ConditionNode>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Set the schedule.
    #[must_use]
    pub const fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Set the usage budget.
    #[must_use]
    pub const fn with_usage(mut self, usage: UsageBudget) -> Self {
        self.usage = usage;
        self
    }

    /// Return the promotion id.
    pub const fn id(&self) -> PromotionUuid {
        self.id
    }

    /// Return the owning tenant.
    pub const fn tenant(&self) -> TenantUuid {
        self.tenant
    }

    /// Return the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Return the kind.
    pub const fn kind(&self) -> PromotionKind {
        self.kind
    }

    /// Return the status.
    pub const fn status(&self) -> PromotionStatus {
        self.status
    }

    /// Return the priority.
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Return whether the promotion is stackable.
    pub const fn is_stackable(&self) -> bool {
        self.stackable
    }

    /// Return the strategy.
    pub const fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Return the condition tree.
    pub const fn condition(&self) -> &ConditionNode {
        &self.condition
    }

    /// Return the schedule.
    pub const fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Return the usage budget.
    pub const fn usage(&self) -> &UsageBudget {
        &self.usage
    }

    /// Whether the promotion may be evaluated at `now`: active, within its
    /// schedule and with usage left.
    pub fn is_eligible_at(&self, now: Timestamp) -> bool {
        self.status == PromotionStatus::Active
            && self.schedule.contains(now)
            && !self.usage.is_exhausted()
    }

    /// Whether the promotion's condition holds for the cart.
    pub fn qualifies(&self, cart: &Cart, context: &EvaluationContext) -> bool {
        self.condition.evaluate(cart, context)
    }

    /// Compute this promotion's discount line item against the cart.
    pub fn apply(&self, cart: &Cart) -> DiscountBreakdown {
        strategies::apply(self, cart)
    }
}
