//! Batch sentiment analysis over tables.
//!
//! Validates that the table has a text column, classifies every row with
//! bounded concurrency and a per-call timeout, and returns an
//! [`AugmentedTable`](crate::table::AugmentedTable) in input order.
//!
//! Failures abort the batch by default ([`FailurePolicy::FailFast`]). Opt into
//! [`FailurePolicy::Fallback`] to keep going; failed rows then read
//! `Unknown, 🤔, N/A` and are listed in
//! [`AugmentedTable::fallback_rows`](crate::table::AugmentedTable::fallback_rows).

// ============ Internal API ============

pub(crate) mod options;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::pipelines::stats::BatchStats;
pub use options::{BatchOptions, FailurePolicy, DEFAULT_TIMEOUT};
pub use pipeline::BatchAnalyzer;
