use crate::resource::ResourceKind;
use crate::retry::RetryPolicy;
use std::time::Duration;

/// Attempt budgets for each probe of a discovery run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudgets {
    /// Probes per tab position (one probe per position)
    pub tab_probe: u32,
    /// Transcript language dropdown trigger; exhaustion ends enumeration
    pub dropdown: u32,
    /// First option of an opened dropdown; exhaustion skips the row
    pub option: u32,
    /// Transcript download anchor; exhaustion skips the row
    pub transcript_anchor: u32,
    /// Lecture download anchor; exhaustion ends enumeration
    pub lecture_anchor: u32,
}

impl Default for RetryBudgets {
    fn default() -> Self {
        Self {
            tab_probe: 1,
            dropdown: 3,
            option: 3,
            transcript_anchor: 5,
            lecture_anchor: 3,
        }
    }
}

/// Tunables shared by every component of a discovery run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Bounded wait applied to each single locate
    pub wait_timeout: Duration,
    /// Pause between two attempts of the same probe
    pub backoff: Duration,
    pub budgets: RetryBudgets,
    /// Row 1 of every tab is a header, so enumeration starts below it
    pub first_item_index: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(20),
            backoff: Duration::from_secs(1),
            budgets: RetryBudgets::default(),
            first_item_index: 2,
        }
    }
}

impl DiscoveryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_budgets(mut self, budgets: RetryBudgets) -> Self {
        self.budgets = budgets;
        self
    }

    pub(crate) fn policy(&self, max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, self.backoff)
    }

    /// Policy for the probe whose exhaustion means "no row at this index"
    pub(crate) fn absence_policy(&self, kind: ResourceKind) -> RetryPolicy {
        match kind {
            ResourceKind::Transcript => self.policy(self.budgets.dropdown),
            ResourceKind::Lecture => self.policy(self.budgets.lecture_anchor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_course_page_timings() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.wait_timeout, Duration::from_secs(20));
        assert_eq!(config.backoff, Duration::from_secs(1));
        assert_eq!(config.first_item_index, 2);
        assert_eq!(config.budgets.transcript_anchor, 5);
    }

    #[test]
    fn test_absence_policy_depends_on_kind() {
        let budgets = RetryBudgets {
            dropdown: 4,
            lecture_anchor: 6,
            ..RetryBudgets::default()
        };
        let config = DiscoveryConfig::new().with_budgets(budgets);
        assert_eq!(
            config.absence_policy(ResourceKind::Transcript).max_attempts(),
            4
        );
        assert_eq!(config.absence_policy(ResourceKind::Lecture).max_attempts(), 6);
    }
}
