//! Single-text sentiment analysis.
//!
//! Classify text as `Positive`, `Negative`, `Neutral`, or `Unknown` when the
//! classifier speaks a label vocabulary we don't recognize. Each result carries a
//! glyph and a display-ready confidence percentage.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use feedback_sentiment::sentiment::{SentimentAnalyzerBuilder, ModernBertSize};
//!
//! # fn main() -> feedback_sentiment::error::Result<()> {
//! let analyzer = SentimentAnalyzerBuilder::modernbert(ModernBertSize::Base).build()?;
//!
//! let item = analyzer.analyze_one("Great service!")?;
//! println!("Sentiment: {item} ({})", item.confidence);
//! # Ok(())
//! # }
//! ```
//!
//! # Bring your own classifier
//!
//! Any [`Classifier`] works, including closures wrapped in [`classifier_fn`]:
//!
//! ```rust
//! use feedback_sentiment::sentiment::{classifier_fn, ClassificationResult, SentimentAnalyzer};
//!
//! # fn main() -> feedback_sentiment::error::Result<()> {
//! let analyzer = SentimentAnalyzer::new(classifier_fn(|_| {
//!     Ok(ClassificationResult::new("LABEL_2", 0.51))
//! }));
//! assert_eq!(analyzer.analyze_one("meh")?.to_string(), "Unknown 🤔");
//! # Ok(())
//! # }
//! ```

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod confidence;
pub(crate) mod label;
pub(crate) mod model;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::models::{ModernBertClassifier, ModernBertSize};
pub use builder::SentimentAnalyzerBuilder;
pub use confidence::{checked_score, format_confidence, NOT_AVAILABLE};
pub use label::{normalize, SentimentCategory};
pub use model::{classifier_fn, ClassificationResult, Classifier};
pub use pipeline::{AnalyzedItem, SentimentAnalyzer};
