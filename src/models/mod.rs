// ============ Model implementations ============

pub(crate) mod modernbert;

pub use modernbert::{ModernBertClassifier, ModernBertSize};
