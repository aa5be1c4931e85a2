use super::pipeline::SentimentAnalyzer;
use crate::error::Result;
use crate::models::modernbert::{load_tokenizer, SentimentModernBertModel};
use crate::models::{ModernBertClassifier, ModernBertSize};
use crate::pipelines::cache::global_cache;
use crate::pipelines::utils::{build_cache_key, DeviceRequest};

crate::pipelines::utils::impl_device_methods!(SentimentAnalyzerBuilder);

/// Builder for a [`SentimentAnalyzer`] backed by a local ModernBERT model.
///
/// Weights are downloaded from the Hugging Face hub on first use and shared
/// between analyzers built for the same size and device.
///
/// # Examples
///
/// ```rust,no_run
/// # use feedback_sentiment::sentiment::{SentimentAnalyzerBuilder, ModernBertSize};
/// # fn main() -> feedback_sentiment::error::Result<()> {
/// let analyzer = SentimentAnalyzerBuilder::modernbert(ModernBertSize::Base)
///     .cpu()
///     .build()?;
///
/// let item = analyzer.analyze_one("The staff were lovely")?;
/// println!("{item} ({})", item.confidence);
/// # Ok(())
/// # }
/// ```
pub struct SentimentAnalyzerBuilder {
    size: ModernBertSize,
    device_request: DeviceRequest,
}

impl SentimentAnalyzerBuilder {
    /// Creates a builder for a ModernBERT sentiment model.
    pub fn modernbert(size: ModernBertSize) -> Self {
        Self {
            size,
            device_request: DeviceRequest::Cpu,
        }
    }

    /// Loads the model (or reuses an already loaded one) and builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if model download, loading or device initialization fails.
    pub fn build(self) -> Result<SentimentAnalyzer<ModernBertClassifier>> {
        let device = self.device_request.resolve()?;
        let key = build_cache_key(&self.size, &device);

        let size = self.size;
        let model = global_cache()
            .get_or_create(&key, || SentimentModernBertModel::new(size, device.clone()))?;
        let tokenizer = load_tokenizer(size)?;

        Ok(SentimentAnalyzer::new(ModernBertClassifier { model, tokenizer }))
    }
}
