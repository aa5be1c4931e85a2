use super::confidence::{checked_score, format_confidence, NOT_AVAILABLE};
use super::label::{normalize, SentimentCategory};
use super::model::Classifier;
use crate::error::Result;
use std::fmt;
use std::sync::Arc;

// ============ Output types ============

/// Canonical result for one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedItem {
    /// Normalized sentiment.
    pub category: SentimentCategory,
    /// Glyph for `category`.
    pub glyph: &'static str,
    /// Confidence as shown to users, e.g. `"93.45%"` or `"N/A"`.
    pub confidence: String,
}

impl AnalyzedItem {
    /// Placeholder recorded for rows whose classification failed in fallback mode.
    pub fn unavailable() -> Self {
        Self {
            category: SentimentCategory::Unknown,
            glyph: SentimentCategory::Unknown.glyph(),
            confidence: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Renders as `"Positive 😊"`.
impl fmt::Display for AnalyzedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category, self.glyph)
    }
}

// ============ Pipeline ============

/// Classifies one text at a time and normalizes the classifier's answer.
///
/// Holds no mutable state; clones share the same classifier handle.
///
/// # Examples
///
/// ```rust
/// use feedback_sentiment::sentiment::{
///     classifier_fn, ClassificationResult, SentimentAnalyzer, SentimentCategory,
/// };
///
/// # fn main() -> feedback_sentiment::error::Result<()> {
/// let analyzer = SentimentAnalyzer::new(classifier_fn(|_| {
///     Ok(ClassificationResult::new("positive", 0.9345))
/// }));
///
/// let item = analyzer.analyze_one("Great service!")?;
/// assert_eq!(item.category, SentimentCategory::Positive);
/// assert_eq!(item.confidence, "93.45%");
/// assert_eq!(item.to_string(), "Positive 😊");
/// # Ok(())
/// # }
/// ```
pub struct SentimentAnalyzer<C: Classifier> {
    pub(crate) classifier: Arc<C>,
}

impl<C: Classifier> Clone for SentimentAnalyzer<C> {
    fn clone(&self) -> Self {
        Self {
            classifier: Arc::clone(&self.classifier),
        }
    }
}

impl<C: Classifier> SentimentAnalyzer<C> {
    /// Wrap a classifier.
    pub fn new(classifier: C) -> Self {
        Self::from_shared(Arc::new(classifier))
    }

    /// Wrap a classifier handle that is already shared elsewhere.
    pub fn from_shared(classifier: Arc<C>) -> Self {
        Self { classifier }
    }

    /// The underlying classifier.
    pub fn classifier(&self) -> &Arc<C> {
        &self.classifier
    }

    /// Classify `text` once and normalize the result.
    ///
    /// The text is handed to the classifier as-is, including empty strings.
    /// Classifier errors are returned unchanged.
    pub fn analyze_one(&self, text: &str) -> Result<AnalyzedItem> {
        let raw = self.classifier.classify(text)?;
        let score = checked_score(raw.score)?;
        let (category, glyph) = normalize(&raw.label);

        tracing::debug!(label = %raw.label, %category, score, "classified text");

        Ok(AnalyzedItem {
            category,
            glyph,
            confidence: format_confidence(score),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::sentiment::{classifier_fn, ClassificationResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn builds_item_from_raw_result() {
        let analyzer = SentimentAnalyzer::new(classifier_fn(|_| {
            Ok(ClassificationResult::new(" NEGATIVE", 0.88))
        }));
        let item = analyzer.analyze_one("Terrible wait").unwrap();
        assert_eq!(
            item,
            AnalyzedItem {
                category: SentimentCategory::Negative,
                glyph: "😢",
                confidence: "88.00%".into(),
            }
        );
    }

    #[test]
    fn calls_classifier_exactly_once_and_passes_text_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let analyzer = SentimentAnalyzer::new(classifier_fn(move |text| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert_eq!(text, "   ");
            Ok(ClassificationResult::new("NEUTRAL", 0.6))
        }));

        analyzer.analyze_one("   ").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn classifier_errors_propagate_unchanged() {
        let analyzer = SentimentAnalyzer::new(classifier_fn(|_| {
            Err(PipelineError::Classification("empty input".into()))
        }));
        let err = analyzer.analyze_one("").unwrap_err();
        assert!(matches!(err, PipelineError::Classification(msg) if msg == "empty input"));
    }

    #[test]
    fn unknown_labels_do_not_fail() {
        let analyzer = SentimentAnalyzer::new(classifier_fn(|_| {
            Ok(ClassificationResult::new("LABEL_0", 0.7))
        }));
        let item = analyzer.analyze_one("hm").unwrap();
        assert_eq!(item.category, SentimentCategory::Unknown);
        assert_eq!(item.to_string(), "Unknown 🤔");
    }

    #[test]
    fn repeated_calls_are_identical() {
        let analyzer = SentimentAnalyzer::new(classifier_fn(|_| {
            Ok(ClassificationResult::new("POSITIVE", 0.95))
        }));
        assert_eq!(
            analyzer.analyze_one("Great service!").unwrap(),
            analyzer.analyze_one("Great service!").unwrap()
        );
    }

    #[test]
    fn nan_score_is_a_format_error() {
        let analyzer = SentimentAnalyzer::new(classifier_fn(|_| {
            Ok(ClassificationResult::new("POSITIVE", f32::NAN))
        }));
        assert!(matches!(
            analyzer.analyze_one("x"),
            Err(PipelineError::Format(_))
        ));
    }
}
