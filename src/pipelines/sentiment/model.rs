use crate::error::Result;

/// Raw output of a classifier for one text.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// Label as emitted by the model, e.g. `"POSITIVE"`, `"negative"` or `"LABEL_0"`.
    pub label: String,
    /// Probability of `label`, nominally in `[0, 1]`.
    pub score: f32,
}

impl ClassificationResult {
    /// Convenience constructor.
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Anything that maps a text to a raw label and score.
///
/// Implementations are shared across worker threads during batch runs and must
/// not rely on per-call mutable state. Failures should be reported as
/// [`PipelineError::Classification`](crate::error::PipelineError::Classification)
/// (or a more specific variant); callers propagate them unchanged.
///
/// Closures implement this trait (see [`classifier_fn`]), which keeps test
/// doubles short.
pub trait Classifier: Send + Sync {
    /// Classify a single text.
    fn classify(&self, text: &str) -> Result<ClassificationResult>;
}

impl<F> Classifier for F
where
    F: Fn(&str) -> Result<ClassificationResult> + Send + Sync,
{
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self(text)
    }
}

/// Use a closure as a [`Classifier`].
///
/// Only pins the closure's signature so it needs no type annotations.
///
/// ```rust
/// use feedback_sentiment::sentiment::{classifier_fn, ClassificationResult, Classifier};
///
/// let classifier = classifier_fn(|text| {
///     Ok(ClassificationResult::new(
///         if text.contains("great") { "POSITIVE" } else { "NEGATIVE" },
///         0.9,
///     ))
/// });
/// assert_eq!(classifier.classify("great").unwrap().label, "POSITIVE");
/// ```
pub fn classifier_fn<F>(f: F) -> F
where
    F: Fn(&str) -> Result<ClassificationResult> + Send + Sync,
{
    f
}
