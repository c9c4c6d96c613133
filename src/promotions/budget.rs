//! Promotion Usage Budget

use serde::{Deserialize, Serialize};

/// Redemption limit for a promotion
///
/// `count` is only ever incremented by the redemption recorder after payment
/// capture; the engine reads it as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageBudget {
    /// Maximum number of redemptions
    #[serde(default)]
    pub limit: Option<u32>,

    /// Redemptions recorded so far
    #[serde(default)]
    pub count: u32,
}

impl UsageBudget {
    /// Create a budget with no limit
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            limit: None,
            count: 0,
        }
    }

    /// Create a budget with a redemption limit
    #[must_use]
    pub const fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            count: 0,
        }
    }

    /// Set the recorded redemption count
    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Check if this budget has a limit
    #[must_use]
    pub const fn has_constraints(&self) -> bool {
        self.limit.is_some()
    }

    /// Check if every permitted redemption has been used
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        match self.limit {
            Some(limit) => self.count >= limit,
            None => false,
        }
    }

    /// Redemptions left, if limited
    #[must_use]
    pub const fn remaining(&self) -> Option<u32> {
        match self.limit {
            Some(limit) => Some(limit.saturating_sub(self.count)),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_budget() {
        let budget = UsageBudget::unlimited().with_count(1_000);

        assert!(!budget.has_constraints());
        assert!(!budget.is_exhausted());
        assert_eq!(budget.remaining(), None);
    }

    #[test]
    fn test_limit_exhausted_at_count() {
        let budget = UsageBudget::with_limit(5);

        assert!(budget.has_constraints());
        assert!(!budget.with_count(4).is_exhausted());
        assert!(budget.with_count(5).is_exhausted());
        assert!(budget.with_count(6).is_exhausted());
    }

    #[test]
    fn test_remaining_never_underflows() {
        let budget = UsageBudget::with_limit(3).with_count(7);

        assert_eq!(budget.remaining(), Some(0));
    }

    #[test]
    fn test_zero_limit_is_always_exhausted() {
        assert!(UsageBudget::with_limit(0).is_exhausted());
    }
}
