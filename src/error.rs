//! Error types for this crate.
//!
//! All fallible operations return [`Result<T>`] which uses [`PipelineError`] as the error type.

use std::time::Duration;
use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`PipelineError`] as the error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The unified error type for all crate errors.
///
/// # Example
///
/// ```rust,no_run
/// use feedback_sentiment::error::PipelineError;
///
/// fn handle_error(e: PipelineError) {
///     match &e {
///         PipelineError::Schema(_) => {
///             // Input table is missing the text column - fix the file
///         }
///         PipelineError::Row { row, source } => {
///             eprintln!("row {row} failed: {source}");
///         }
///         PipelineError::Classification(_) | PipelineError::Timeout { .. } => {
///             // Classifier rejected or stalled on a single text
///         }
///         PipelineError::Download(_) => {
///             // Network issue - retry with backoff
///         }
///         _ => {
///             eprintln!("Error: {e}");
///         }
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// Network or download failure. Retry may help.
    #[error("{0}")]
    Download(String),

    /// Tokenization failure. Check input text.
    #[error("{0}")]
    Tokenization(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// The classifier failed on a single text.
    #[error("classification failed: {0}")]
    Classification(String),

    /// The classifier did not answer within the per-call timeout.
    #[error("classification timed out after {after:?}")]
    Timeout {
        /// Configured per-call timeout.
        after: Duration,
    },

    /// Input table does not have the shape the batch analyzer needs.
    /// Nothing was classified.
    #[error("{0}")]
    Schema(String),

    /// The classifier returned a score that cannot be displayed.
    #[error("{0}")]
    Format(String),

    /// A batch row failed. `row` is 1-based and counts data rows only.
    #[error("row {row}: {source}")]
    Row {
        /// 1-based data row number.
        row: usize,
        /// What went wrong on that row.
        #[source]
        source: Box<PipelineError>,
    },

    /// Malformed delimited input, or failure writing output.
    #[error("{0}")]
    Csv(String),

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),
}

impl PipelineError {
    /// Row number of a failed batch row, if this error came from one.
    pub fn row(&self) -> Option<usize> {
        match self {
            PipelineError::Row { row, .. } => Some(*row),
            _ => None,
        }
    }
}

impl From<hf_hub::api::sync::ApiError> for PipelineError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        PipelineError::Download(format!("HuggingFace API error: {}", value))
    }
}

impl From<candle_core::Error> for PipelineError {
    fn from(value: candle_core::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(value: csv::Error) -> Self {
        PipelineError::Csv(format!("CSV error: {}", value))
    }
}
