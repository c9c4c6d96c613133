//! Segment Membership
//!
//! Materialized segment member sets, written by segment refreshes and read
//! when building evaluation contexts.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::debug;

use crate::uuids::{CustomerUuid, SegmentUuid, TenantUuid};

/// Errors raised by a membership store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MembershipError {
    /// A writer panicked while holding the store.
    #[error("membership store is poisoned")]
    Poisoned,

    /// Backing store could not be reached.
    #[error("membership store unavailable: {0}")]
    Unavailable(String),
}

impl<T> From<PoisonError<T>> for MembershipError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

/// Storage for materialized segment membership.
#[automock]
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Replace a segment's member set as of `refreshed_at`.
    ///
    /// Returns `false`, leaving the stored set untouched, if a newer refresh
    /// is already stored.
    async fn replace_members(
        &self,
        tenant: TenantUuid,
        segment: SegmentUuid,
        members: FxHashSet<CustomerUuid>,
        refreshed_at: Timestamp,
    ) -> Result<bool, MembershipError>;

    /// Return a segment's current members.
    async fn members(
        &self,
        tenant: TenantUuid,
        segment: SegmentUuid,
    ) -> Result<FxHashSet<CustomerUuid>, MembershipError>;

    /// Return every segment of `tenant` the customer belongs to.
    async fn segments_for_customer(
        &self,
        tenant: TenantUuid,
        customer: CustomerUuid,
    ) -> Result<FxHashSet<SegmentUuid>, MembershipError>;
}

#[derive(Debug)]
struct MemberSet {
    members: FxHashSet<CustomerUuid>,
    refreshed_at: Timestamp,
}

/// Membership held in memory.
#[derive(Debug, Default)]
pub struct InMemoryMembershipStore {
    segments: RwLock<FxHashMap<(TenantUuid, SegmentUuid), MemberSet>>,
}

impl InMemoryMembershipStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn replace_members(
        &self,
        tenant: TenantUuid,
        segment: SegmentUuid,
        members: FxHashSet<CustomerUuid>,
        refreshed_at: Timestamp,
    ) -> Result<bool, MembershipError> {
        let mut segments = self.segments.write()?;

        let stored_at = segments
            .get(&(tenant, segment))
            .map(|current| current.refreshed_at);

        if let Some(stored_at) = stored_at.filter(|stored_at| *stored_at > refreshed_at) {
            debug!(
                segment_uuid = %segment,
                stored = %stored_at,
                attempted = %refreshed_at,
                "ignoring stale segment refresh"
            );

            return Ok(false);
        }

        segments.insert(
            (tenant, segment),
            MemberSet {
                members,
                refreshed_at,
            },
        );

        Ok(true)
    }

    async fn members(
        &self,
        tenant: TenantUuid,
        segment: SegmentUuid,
    ) -> Result<FxHashSet<CustomerUuid>, MembershipError> {
        let segments = self.segments.read()?;

        Ok(segments
            .get(&(tenant, segment))
            .map(|set| set.members.clone())
            .unwrap_or_default())
    }

    async fn segments_for_customer(
        &self,
        tenant: TenantUuid,
        customer: CustomerUuid,
    ) -> Result<FxHashSet<SegmentUuid>, MembershipError> {
        let segments = self.segments.read()?;

        Ok(segments
            .iter()
            .filter(|((t, _), set)| *t == tenant && set.members.contains(&customer))
            .map(|((_, segment), _)| *segment)
            .collect())
    }
}
