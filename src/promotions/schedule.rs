//! Promotion Schedule

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Optional start and end instants bounding when a promotion runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Earliest instant the promotion runs
    #[serde(default)]
    pub starts_at: Option<Timestamp>,

    /// Latest instant the promotion runs
    #[serde(default)]
    pub ends_at: Option<Timestamp>,
}

impl Schedule {
    /// A schedule with no bounds
    #[must_use]
    pub const fn always() -> Self {
        Self {
            starts_at: None,
            ends_at: None,
        }
    }

    /// A schedule between two instants
    #[must_use]
    pub const fn between(starts_at: Timestamp, ends_at: Timestamp) -> Self {
        Self {
            starts_at: Some(starts_at),
            ends_at: Some(ends_at),
        }
    }

    /// Set the start instant
    #[must_use]
    pub const fn starting(mut self, starts_at: Timestamp) -> Self {
        self.starts_at = Some(starts_at);
        self
    }

    /// Set the end instant
    #[must_use]
    pub const fn ending(mut self, ends_at: Timestamp) -> Self {
        self.ends_at = Some(ends_at);
        self
    }

    /// Whether `now` is within the schedule. Both bounds are inclusive.
    #[must_use]
    pub fn contains(&self, now: Timestamp) -> bool {
        self.starts_at.is_none_or(|starts_at| starts_at <= now)
            && self.ends_at.is_none_or(|ends_at| ends_at >= now)
    }
}
