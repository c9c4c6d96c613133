//! Segment Refresh

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use jiff::Timestamp;
use tracing::{Span, info, warn};

use crate::segments::{
    CustomerSegment, SegmentError, evaluator::SegmentEvaluator, membership::MembershipStore,
};

/// Recomputes a segment's members and stores the result.
#[derive(Clone)]
pub struct SegmentRefresher {
    evaluator: SegmentEvaluator,
    store: Arc<dyn MembershipStore>,
}

impl Debug for SegmentRefresher {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SegmentRefresher")
            .field("evaluator", &self.evaluator)
            .finish_non_exhaustive()
    }
}

impl SegmentRefresher {
    /// Create a refresher.
    pub fn new(evaluator: SegmentEvaluator, store: Arc<dyn MembershipStore>) -> Self {
        Self { evaluator, store }
    }

    /// Evaluate the segment's rule and replace its stored members as of `now`.
    ///
    /// Returns the segment with its new member count and refresh time.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::Superseded`] if a newer refresh was stored
    /// first, or any ledger or membership store error.
    #[tracing::instrument(
        name = "segments.refresher.refresh",
        skip(self, segment),
        fields(
            tenant_uuid = %segment.tenant_id,
            segment_uuid = %segment.id,
            member_count = tracing::field::Empty
        ),
        err
    )]
    pub async fn refresh(
        &self,
        segment: &CustomerSegment,
        now: Timestamp,
    ) -> Result<CustomerSegment, SegmentError> {
        let members = self
            .evaluator
            .evaluate(&segment.rules, segment.tenant_id)
            .await?;

        let member_count = members.len();

        Span::current().record("member_count", member_count);

        let applied = self
            .store
            .replace_members(segment.tenant_id, segment.id, members, now)
            .await?;

        if !applied {
            warn!("newer segment membership already stored");

            return Err(SegmentError::Superseded(segment.id));
        }

        info!(member_count, "refreshed segment");

        Ok(CustomerSegment {
            member_count,
            last_refreshed_at: Some(now),
            ..segment.clone()
        })
    }
}
