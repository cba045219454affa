//! Run reports and aggregate statistics.

use crate::download::acquire::AcquireOutcome;

/// One item that could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub media_id: u64,
    pub author_id: u64,
    pub error: String,
}

/// Result of one scheduler run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub downloaded: u64,
    pub skipped: u64,
    pub unavailable: u64,
    pub failures: Vec<ItemFailure>,
}

impl RunReport {
    pub fn record(&mut self, outcome: AcquireOutcome) {
        match outcome {
            AcquireOutcome::Downloaded => self.downloaded += 1,
            AcquireOutcome::AlreadyDone => self.skipped += 1,
            AcquireOutcome::Unavailable => self.unavailable += 1,
        }
    }

    pub fn record_failure(&mut self, failure: ItemFailure) {
        self.failures.push(failure);
    }

    /// Items present on disk after the run (fresh downloads and skips).
    pub fn acquired(&self) -> u64 {
        self.downloaded + self.skipped
    }

    pub fn total(&self) -> u64 {
        self.acquired() + self.unavailable + self.failures.len() as u64
    }
}

/// Per-subscription state.
#[derive(Debug, Default)]
pub struct SubscriptionState {
    pub username: String,
    pub user_id: u64,
    pub posts: u64,
    pub media: u64,
    pub report: RunReport,
}

impl SubscriptionState {
    pub fn new(username: String, user_id: u64) -> Self {
        Self {
            username,
            user_id,
            ..Default::default()
        }
    }
}

/// Statistics across all subscriptions.
#[derive(Debug, Default)]
pub struct GlobalState {
    pub downloaded: u64,
    pub skipped: u64,
    pub unavailable: u64,
    pub failures: Vec<ItemFailure>,
    pub subscriptions_processed: u64,
    pub subscriptions_failed: Vec<(String, String)>,
    /// Processed subscriptions, in processing order.
    pub subscriptions: Vec<SubscriptionState>,
}

impl GlobalState {
    /// Add a processed subscription and its statistics.
    pub fn add_subscription(&mut self, state: SubscriptionState) {
        self.downloaded += state.report.downloaded;
        self.skipped += state.report.skipped;
        self.unavailable += state.report.unavailable;
        self.failures.extend(state.report.failures.iter().cloned());
        self.subscriptions_processed += 1;
        self.subscriptions.push(state);
    }

    /// Mark a subscription as failed.
    pub fn mark_subscription_failed(&mut self, username: &str, error: String) {
        self.subscriptions_failed.push((username.to_string(), error));
    }

    /// Whether any item or subscription failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty() || !self.subscriptions_failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = RunReport::default();
        report.record(AcquireOutcome::Downloaded);
        report.record(AcquireOutcome::Downloaded);
        report.record(AcquireOutcome::AlreadyDone);
        report.record(AcquireOutcome::Unavailable);
        report.record_failure(ItemFailure {
            media_id: 1,
            author_id: 2,
            error: "boom".into(),
        });

        assert_eq!(report.acquired(), 3);
        assert_eq!(report.total(), 5);
    }

    #[test]
    fn test_global_aggregation() {
        let mut state = SubscriptionState::new("alice".into(), 1);
        state.report.record(AcquireOutcome::Downloaded);
        state.report.record_failure(ItemFailure {
            media_id: 3,
            author_id: 1,
            error: "HTTP 404".into(),
        });

        let mut global = GlobalState::default();
        assert!(!global.has_failures());

        global.add_subscription(state);
        assert_eq!(global.downloaded, 1);
        assert_eq!(global.subscriptions_processed, 1);
        assert_eq!(global.subscriptions[0].username, "alice");
        assert!(global.has_failures());

        let mut other = GlobalState::default();
        other.mark_subscription_failed("bob", "Counting posts failed".into());
        assert!(other.has_failures());
    }
}
