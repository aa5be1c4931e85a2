use crate::table::TextColumn;
use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

/// Per-call classifier timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What to do when the classifier fails on one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the batch and return the failing row's error. No table is produced.
    #[default]
    FailFast,
    /// Record `Unknown / 🤔 / N/A` for the row and keep going. The output is
    /// marked partial.
    Fallback,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailFast => f.write_str("fail-fast"),
            FailurePolicy::Fallback => f.write_str("fallback"),
        }
    }
}

/// Settings for [`BatchAnalyzer`](super::BatchAnalyzer).
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum classifier calls in flight at once. Values below 1 are treated as 1.
    pub concurrency: usize,
    /// Per-call timeout. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Per-row failure handling.
    pub failure_policy: FailurePolicy,
    /// Reject tables with more rows than this before classifying anything.
    pub max_rows: Option<usize>,
    /// Which column holds the text.
    pub text_column: TextColumn,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(4),
            timeout: Some(DEFAULT_TIMEOUT),
            failure_policy: FailurePolicy::default(),
            max_rows: None,
            text_column: TextColumn::default(),
        }
    }
}

impl BatchOptions {
    /// Set [`Self::concurrency`].
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the per-call timeout; `None` disables it.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the per-row failure policy.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Shorthand for `failure_policy(FailurePolicy::Fallback)`.
    pub fn fallback(self) -> Self {
        self.failure_policy(FailurePolicy::Fallback)
    }

    /// Cap the number of rows accepted.
    pub fn max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Use a different text column.
    pub fn text_column(mut self, column: TextColumn) -> Self {
        self.text_column = column;
        self
    }

    pub(crate) fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fail_fast_with_timeout() {
        let options = BatchOptions::default();
        assert_eq!(options.failure_policy, FailurePolicy::FailFast);
        assert_eq!(options.timeout, Some(DEFAULT_TIMEOUT));
        assert_eq!(options.text_column.name(), "Text");
        assert!(options.concurrency >= 1);
    }

    #[test]
    fn zero_concurrency_still_makes_progress() {
        assert_eq!(BatchOptions::default().concurrency(0).effective_concurrency(), 1);
    }
}
