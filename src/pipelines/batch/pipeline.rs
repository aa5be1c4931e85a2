use super::options::{BatchOptions, FailurePolicy};
use crate::error::{PipelineError, Result};
use crate::pipelines::stats::BatchStats;
use crate::sentiment::{AnalyzedItem, Classifier, SentimentAnalyzer};
use crate::table::{AugmentedTable, Table};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Runs a [`SentimentAnalyzer`] over every row of a [`Table`].
///
/// Rows are classified concurrently (up to [`BatchOptions::concurrency`] calls in
/// flight), each on tokio's blocking pool, and merged back by row index, so the
/// output order always matches the input order.
///
/// The limit counts classifier calls, not rows awaited. A call that timed out,
/// or that was still running when a fail-fast batch aborted, keeps its slot
/// until the classifier returns. Clones share the same limit.
///
/// # Examples
///
/// ```rust
/// use feedback_sentiment::batch::{BatchAnalyzer, BatchOptions};
/// use feedback_sentiment::sentiment::{classifier_fn, ClassificationResult, SentimentAnalyzer};
/// use feedback_sentiment::table::Table;
///
/// # #[tokio::main]
/// # async fn main() -> feedback_sentiment::error::Result<()> {
/// let analyzer = SentimentAnalyzer::new(classifier_fn(|text| {
///     let label = if text.contains("Great") { "POSITIVE" } else { "NEGATIVE" };
///     Ok(ClassificationResult::new(label, 0.95))
/// }));
///
/// let batch = BatchAnalyzer::new(analyzer, BatchOptions::default());
/// let output = batch
///     .analyze_table(&Table::from_texts(["Great service!", "Terrible wait"]))
///     .await?;
///
/// assert_eq!(output.items()[0].to_string(), "Positive 😊");
/// assert_eq!(output.items()[1].to_string(), "Negative 😢");
/// # Ok(())
/// # }
/// ```
pub struct BatchAnalyzer<C: Classifier> {
    analyzer: SentimentAnalyzer<C>,
    options: BatchOptions,
    limiter: Arc<Semaphore>,
}

impl<C: Classifier> Clone for BatchAnalyzer<C> {
    fn clone(&self) -> Self {
        Self {
            analyzer: self.analyzer.clone(),
            options: self.options.clone(),
            limiter: Arc::clone(&self.limiter),
        }
    }
}

impl<C: Classifier + 'static> BatchAnalyzer<C> {
    /// Wrap `analyzer` with batch settings.
    pub fn new(analyzer: SentimentAnalyzer<C>, options: BatchOptions) -> Self {
        let limiter = Arc::new(Semaphore::new(options.effective_concurrency()));
        Self {
            analyzer,
            options,
            limiter,
        }
    }

    /// Current batch settings.
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// The single-item analyzer used for each row.
    pub fn analyzer(&self) -> &SentimentAnalyzer<C> {
        &self.analyzer
    }

    /// Classify every row of `table` and append `Sentiment`, `Emoji` and `Confidence`.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Schema`] if the text column is missing or the table
    ///   exceeds [`BatchOptions::max_rows`]. Checked before any row is classified.
    /// - [`PipelineError::Row`] under [`FailurePolicy::FailFast`] when a row fails
    ///   or times out. The first failure to complete aborts the batch.
    pub async fn analyze_table(&self, table: &Table) -> Result<AugmentedTable> {
        let stats = BatchStats::start();
        let texts = table.texts(&self.options.text_column)?;

        if let Some(max) = self.options.max_rows {
            if texts.len() > max {
                return Err(PipelineError::Schema(format!(
                    "Input has {} rows, more than the limit of {}",
                    texts.len(),
                    max
                )));
            }
        }

        let row_count = texts.len();
        let concurrency = self.options.effective_concurrency();
        let policy = self.options.failure_policy;
        tracing::info!(rows = row_count, concurrency, %policy, "analyzing table");

        let jobs = texts.into_iter().enumerate().map(|(index, text)| {
            let analyzer = self.analyzer.clone();
            let text = text.to_owned();
            let limiter = Arc::clone(&self.limiter);
            let timeout = self.options.timeout;
            async move { (index, classify_row(analyzer, limiter, text, timeout).await) }
        });
        let mut outcomes = stream::iter(jobs).buffer_unordered(concurrency);

        let mut results: Vec<Option<AnalyzedItem>> = vec![None; row_count];
        let mut fallback_rows = Vec::new();

        while let Some((index, outcome)) = outcomes.next().await {
            let row = index + 1;
            let item = match (outcome, policy) {
                (Ok(item), _) => item,
                (Err(err), FailurePolicy::FailFast) => {
                    tracing::warn!(row, error = %err, "row failed, aborting batch");
                    return Err(PipelineError::Row {
                        row,
                        source: Box::new(err),
                    });
                }
                (Err(err), FailurePolicy::Fallback) => {
                    tracing::warn!(row, error = %err, "row failed, recording fallback");
                    fallback_rows.push(row);
                    AnalyzedItem::unavailable()
                }
            };
            results[index] = Some(item);
        }

        let items = results
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| PipelineError::Unexpected("A row produced no result".into()))?;
        fallback_rows.sort_unstable();

        let stats = stats.finish(row_count, fallback_rows.len());
        tracing::info!(
            rows = stats.rows_processed,
            fallback = stats.fallback_rows,
            elapsed_ms = stats.total_time.as_millis() as u64,
            "table analyzed"
        );

        AugmentedTable::new(table.clone(), items, fallback_rows, stats)
    }
}

impl<C: Classifier + 'static> SentimentAnalyzer<C> {
    /// Batch analyzer sharing this analyzer's classifier.
    pub fn batch(&self, options: BatchOptions) -> BatchAnalyzer<C> {
        BatchAnalyzer::new(self.clone(), options)
    }
}

async fn classify_row<C: Classifier + 'static>(
    analyzer: SentimentAnalyzer<C>,
    limiter: Arc<Semaphore>,
    text: String,
    timeout: Option<Duration>,
) -> Result<AnalyzedItem> {
    // The timeout starts once a slot is free, not while queued behind a detached call.
    let permit = limiter
        .acquire_owned()
        .await
        .map_err(|e| PipelineError::Unexpected(format!("concurrency limiter closed: {e}")))?;

    // The permit moves into the blocking call and is released when the classifier returns.
    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        analyzer.analyze_one(&text)
    });

    let joined = match timeout {
        Some(after) => tokio::time::timeout(after, task)
            .await
            .map_err(|_| PipelineError::Timeout { after })?,
        None => task.await,
    };

    joined.map_err(|e| PipelineError::Classification(format!("classifier task failed: {e}")))?
}
