use candle_core::{DType, Device, Tensor, D};
use candle_nn::{ops::softmax, VarBuilder};
use candle_transformers::models::modernbert::{
    ClassifierConfig, ClassifierPooling, Config,
    ModernBertForSequenceClassification as CandleModernBertForSequenceClassification,
};
use hf_hub::{api::sync::Api, Repo, RepoType};
use serde::Deserialize;
use std::collections::HashMap;
use tokenizers::Tokenizer;

use crate::error::{PipelineError, Result};
use crate::pipelines::cache::ModelOptions;
use crate::pipelines::sentiment::model::{ClassificationResult, Classifier};

/// Available ModernBERT model sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModernBertSize {
    /// Base model (~150M parameters).
    Base,
    /// Large model (~400M parameters).
    Large,
}

impl ModernBertSize {
    fn repo_id(self) -> &'static str {
        match self {
            ModernBertSize::Base => "clapAI/modernBERT-base-multilingual-sentiment",
            ModernBertSize::Large => "clapAI/modernBERT-large-multilingual-sentiment",
        }
    }
}

impl std::fmt::Display for ModernBertSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModernBertSize::Base => "modernbert-base",
            ModernBertSize::Large => "modernbert-large",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for ModernBertSize {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(ModernBertSize::Base),
            "large" => Ok(ModernBertSize::Large),
            other => Err(PipelineError::Unexpected(format!(
                "Unknown ModernBERT size '{other}'. Expected 'base' or 'large'."
            ))),
        }
    }
}

impl ModelOptions for ModernBertSize {
    fn cache_key(&self) -> String {
        self.to_string()
    }
}

/// Sequence-classification weights plus label table. Shared between analyzers
/// through the model cache.
pub struct SentimentModernBertModel {
    model: CandleModernBertForSequenceClassification,
    device: Device,
    id2label: HashMap<String, String>,
}

impl SentimentModernBertModel {
    pub fn new(size: ModernBertSize, device: Device) -> Result<Self> {
        tracing::info!(model = size.repo_id(), device = ?device.location(), "loading classifier");

        let (config, vb, id2label) = load_classifier_model(size.repo_id(), &device)?;
        let model = CandleModernBertForSequenceClassification::load(vb, &config)?;

        Ok(Self {
            model,
            device,
            id2label,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    fn predict_with_score(&self, tokenizer: &Tokenizer, text: &str) -> Result<ClassificationResult> {
        let tokens = tokenizer.encode(text, true).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Tokenization failed on '{}': {}",
                &text.chars().take(50).collect::<String>(),
                e
            ))
        })?;

        let input_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = self.model.forward(&input_ids, &attention_mask)?;
        let pred_id = logits.argmax(D::Minus1)?.squeeze(0)?.to_scalar::<u32>()?;

        let probs = softmax(&logits, D::Minus1)?;
        let probs_vec = probs.squeeze(0)?.to_vec1::<f32>()?;
        let score = probs_vec.get(pred_id as usize).copied().unwrap_or(0.0);

        let label = self
            .id2label
            .get(&pred_id.to_string())
            .ok_or_else(|| {
                let available: Vec<&str> = self.id2label.keys().map(String::as_str).collect();
                PipelineError::Classification(format!(
                    "Predicted label ID {} not in id2label. Available: {}",
                    pred_id,
                    available.join(", ")
                ))
            })?
            .clone();

        Ok(ClassificationResult { label, score })
    }
}

/// [`Classifier`] backed by a ModernBERT sentiment model running on Candle.
///
/// Build one with [`SentimentAnalyzerBuilder::modernbert`](crate::sentiment::SentimentAnalyzerBuilder::modernbert).
pub struct ModernBertClassifier {
    pub(crate) model: std::sync::Arc<SentimentModernBertModel>,
    pub(crate) tokenizer: Tokenizer,
}

impl ModernBertClassifier {
    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &Device {
        self.model.device()
    }
}

impl Classifier for ModernBertClassifier {
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.model.predict_with_score(&self.tokenizer, text)
    }
}

pub(crate) fn load_tokenizer(size: ModernBertSize) -> Result<Tokenizer> {
    let api = Api::new()?;
    let repo = api.repo(Repo::new(size.repo_id().to_string(), RepoType::Model));
    let tokenizer_path = repo.get("tokenizer.json")?;
    let path_str = tokenizer_path.display().to_string();
    Tokenizer::from_file(&tokenizer_path).map_err(|e| {
        PipelineError::Tokenization(format!(
            "Failed to load tokenizer from '{}': {}",
            path_str, e
        ))
    })
}

#[derive(Deserialize)]
struct ClassifierConfigJson {
    #[serde(default)]
    id2label: HashMap<String, String>,
    #[serde(default)]
    label2id: HashMap<String, u32>,
}

fn patch_config_num_labels(config: &mut Config, num_labels: usize) {
    let current = config
        .classifier_config
        .as_ref()
        .map(|c| c.id2label.len())
        .unwrap_or(0);

    if config.classifier_config.is_none() || current != num_labels {
        let id2label: HashMap<String, String> = (0..num_labels)
            .map(|i| (i.to_string(), format!("label_{i}")))
            .collect();
        let label2id: HashMap<String, String> = id2label
            .iter()
            .map(|(k, v)| (v.clone(), k.clone()))
            .collect();

        config.classifier_config = Some(ClassifierConfig {
            id2label,
            label2id,
            classifier_pooling: ClassifierPooling::default(),
        });
    }
}

fn load_classifier_model(
    repo_id: &str,
    device: &Device,
) -> Result<(Config, VarBuilder<'static>, HashMap<String, String>)> {
    let api = Api::new()?;
    let repo = api.repo(Repo::new(repo_id.to_string(), RepoType::Model));

    let config_path = repo.get("config.json")?;
    let weights_path = repo
        .get("model.safetensors")
        .or_else(|_| repo.get("pytorch_model.bin"))?;

    let config_str = std::fs::read_to_string(&config_path)?;
    let mut config: Config = serde_json::from_str(&config_str)?;
    let class_cfg: ClassifierConfigJson = serde_json::from_str(&config_str)?;

    let num_labels = class_cfg.label2id.len().max(class_cfg.id2label.len());
    if num_labels == 0 {
        return Err(PipelineError::Unexpected(format!(
            "'{repo_id}' config.json has no id2label/label2id; not a classifier"
        )));
    }
    patch_config_num_labels(&mut config, num_labels);

    let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
        unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? }
    } else {
        VarBuilder::from_pth(&weights_path, DType::F32, device)?
    };

    Ok((config, vb, class_cfg.id2label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_size_names() {
        assert_eq!("base".parse::<ModernBertSize>().unwrap(), ModernBertSize::Base);
        assert_eq!(" Large ".parse::<ModernBertSize>().unwrap(), ModernBertSize::Large);
        assert!("huge".parse::<ModernBertSize>().is_err());
    }

    #[test]
    fn cache_keys_differ_by_size() {
        assert_ne!(
            ModernBertSize::Base.cache_key(),
            ModernBertSize::Large.cache_key()
        );
    }
}
