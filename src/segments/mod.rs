//! Customer Segments
//!
//! Segments are named sets of customers selected by rules over their order
//! history. Membership is computed off the checkout path, stored, and read
//! back into an [`EvaluationContext`](crate::context::EvaluationContext) when
//! a cart is priced.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    conditions::Comparator,
    uuids::{SegmentUuid, TenantUuid},
};

pub mod evaluator;
pub mod ledger;
pub mod membership;
pub mod refresh;

pub use evaluator::{SegmentError, SegmentEvaluator, SegmentEvaluatorConfig, members_of};
pub use ledger::{
    CustomerAggregate, InMemoryLedger, LedgerError, LedgerPage, LedgerSnapshot, MockOrderLedger,
    OrderLedger,
};
pub use membership::{
    InMemoryMembershipStore, MembershipError, MembershipStore, MockMembershipStore,
};
pub use refresh::SegmentRefresher;

/// Rule selecting customers by their order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentRule {
    /// Lifetime spend compared against a value.
    TotalSpent {
        /// Comparison operator.
        op: Comparator,

        /// Threshold amount.
        value: Decimal,
    },

    /// Number of orders compared against a value.
    OrderCount {
        /// Comparison operator.
        op: Comparator,

        /// Threshold count.
        value: u64,
    },

    /// Customers who registered at or before `date` and have ordered.
    RegisteredBefore {
        /// Latest registration instant.
        date: Timestamp,
    },

    /// Customers matched by every child rule.
    And {
        /// Child rules.
        children: Vec<SegmentRule>,
    },

    /// Customers matched by any child rule.
    Or {
        /// Child rules.
        children: Vec<SegmentRule>,
    },
}

impl SegmentRule {
    /// Check a single customer's aggregate against a leaf rule.
    ///
    /// Returns `None` for `and`/`or`, which combine sets rather than test one
    /// customer.
    pub fn matches(&self, aggregate: &CustomerAggregate) -> Option<bool> {
        match self {
            Self::TotalSpent { op, value } => Some(op.compare(&aggregate.total_spent, value)),
            Self::OrderCount { op, value } => Some(op.compare(&aggregate.order_count, value)),
            Self::RegisteredBefore { date } => {
                Some(aggregate.registered_at.is_some_and(|at| at <= *date))
            }
            Self::And { .. } | Self::Or { .. } => None,
        }
    }
}

/// A named customer segment and its last materialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSegment {
    /// Segment id.
    #[serde(default)]
    pub id: SegmentUuid,

    /// Owning tenant.
    pub tenant_id: TenantUuid,

    /// Display name.
    pub name: String,

    /// Membership rule.
    pub rules: SegmentRule,

    /// Members at the last refresh.
    #[serde(default)]
    pub member_count: usize,

    /// When membership was last refreshed.
    #[serde(default)]
    pub last_refreshed_at: Option<Timestamp>,
}

impl CustomerSegment {
    /// Create a segment that has never been refreshed.
    pub fn new(tenant_id: TenantUuid, name: impl Into<String>, rules: SegmentRule) -> Self {
        Self {
            id: SegmentUuid::new(),
            tenant_id,
            name: name.into(),
            rules,
            member_count: 0,
            last_refreshed_at: None,
        }
    }
}
