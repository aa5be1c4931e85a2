//! Sentiment analysis for customer feedback, powered by [Candle](https://github.com/huggingface/candle).
//!
//! Classify one text, or every row of a CSV, into `Positive`, `Negative`,
//! `Neutral` or `Unknown`, with a glyph and a confidence percentage.
//!
//! - [`sentiment`]: single-text analysis and the [`Classifier`](sentiment::Classifier) seam.
//! - [`batch`]: ordered, concurrent analysis of a whole [`Table`](table::Table).
//! - [`table`]: CSV parsing, schema checks and export.

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod error;
pub mod table;

pub use pipelines::{batch, sentiment};
