//! Segment Evaluator

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use rustc_hash::FxHashSet;
use serde::Deserialize;
use thiserror::Error;
use tracing::{Span, info};

use crate::{
    segments::{
        SegmentRule,
        ledger::{LedgerError, LedgerSnapshot, OrderLedger},
        membership::MembershipError,
    },
    uuids::{CustomerUuid, SegmentUuid, TenantUuid},
};

const DEFAULT_PAGE_SIZE: usize = 500;

/// Errors raised while computing or storing segment membership.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// The order ledger could not be read.
    #[error("failed to read order ledger")]
    Ledger(#[from] LedgerError),

    /// The membership store could not be read or written.
    #[error("failed to access segment membership")]
    Membership(#[from] MembershipError),

    /// A newer refresh of the segment was already stored.
    #[error("segment {0} already has a newer refresh")]
    Superseded(SegmentUuid),
}

/// Segment evaluator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SegmentEvaluatorConfig {
    /// Customers fetched per ledger query.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for SegmentEvaluatorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Computes which customers a segment rule selects.
#[derive(Clone)]
pub struct SegmentEvaluator {
    ledger: Arc<dyn OrderLedger>,
    config: SegmentEvaluatorConfig,
}

impl Debug for SegmentEvaluator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SegmentEvaluator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SegmentEvaluator {
    /// Create an evaluator with the default settings.
    pub fn new(ledger: Arc<dyn OrderLedger>) -> Self {
        Self::with_config(ledger, SegmentEvaluatorConfig::default())
    }

    /// Create an evaluator with explicit settings.
    pub fn with_config(ledger: Arc<dyn OrderLedger>, config: SegmentEvaluatorConfig) -> Self {
        Self { ledger, config }
    }

    /// Return the settings.
    pub const fn config(&self) -> &SegmentEvaluatorConfig {
        &self.config
    }

    /// Return the customers of `tenant` selected by `rule`.
    ///
    /// # Errors
    ///
    /// Returns a [`SegmentError`] if the ledger cannot be read.
    #[tracing::instrument(
        name = "segments.evaluator.evaluate",
        skip(self, rule),
        fields(
            tenant_uuid = %tenant,
            customers = tracing::field::Empty,
            members = tracing::field::Empty
        ),
        err
    )]
    pub async fn evaluate(
        &self,
        rule: &SegmentRule,
        tenant: TenantUuid,
    ) -> Result<FxHashSet<CustomerUuid>, SegmentError> {
        let snapshot =
            LedgerSnapshot::load(self.ledger.as_ref(), tenant, self.config.page_size).await?;

        let members = members_of(rule, &snapshot);

        let span = Span::current();

        span.record("customers", snapshot.len());
        span.record("members", members.len());

        info!(members = members.len(), "evaluated segment rule");

        Ok(members)
    }
}

/// Return the customers in `snapshot` selected by `rule`.
///
/// `and` intersects and `or` unions its children's sets. Either with no
/// children selects nobody.
pub fn members_of(rule: &SegmentRule, snapshot: &LedgerSnapshot) -> FxHashSet<CustomerUuid> {
    match rule {
        SegmentRule::And { children } => {
            let mut sets = children.iter().map(|child| members_of(child, snapshot));

            let Some(first) = sets.next() else {
                return FxHashSet::default();
            };

            sets.fold(first, |acc, set| acc.intersection(&set).copied().collect())
        }
        SegmentRule::Or { children } => children
            .iter()
            .flat_map(|child| members_of(child, snapshot))
            .collect(),
        leaf => snapshot
            .aggregates()
            .iter()
            .filter(|aggregate| leaf.matches(aggregate).unwrap_or(false))
            .map(|aggregate| aggregate.customer_id)
            .collect(),
    }
}
