//! ModernBERT sentiment classifier.
//!
//! Wraps the `candle-transformers` ModernBERT sequence-classification head with
//! weights fine-tuned for three-way sentiment (negative / neutral / positive).

use std::collections::HashMap;

use candle_core::{DType, Device, Tensor, D};
use candle_nn::{ops::softmax, VarBuilder};
use candle_transformers::models::modernbert::{
    Config, ModernBertForSequenceClassification as CandleModernBertForSequenceClassification,
};
use tokenizers::Tokenizer;

use crate::core::{ModelOptions, PipelineError, Result};
use crate::loaders::{HfLoader, TokenizerLoader};
use crate::pipelines::sentiment::model::SentimentAnalysisModel;
use crate::pipelines::sentiment::pipeline::{is_negative_label, is_positive_label};

/// Available ModernBERT model sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModernBertSize {
    /// Base model (~150M parameters).
    Base,
    /// Large model (~400M parameters).
    Large,
}

impl ModernBertSize {
    fn sentiment_repo(self) -> &'static str {
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

impl ModelOptions for ModernBertSize {
    fn cache_key(&self) -> String {
        format!("{self}-sentiment")
    }
}

/// ModernBERT fine-tuned for sentiment classification.
pub struct SentimentModernBertModel {
    model: CandleModernBertForSequenceClassification,
    device: Device,
    /// Class labels indexed by class id.
    labels: Vec<String>,
}

impl SentimentModernBertModel {
    pub fn new(size: ModernBertSize, device: Device) -> Result<Self> {
        let repo = size.sentiment_repo();
        tracing::debug!(repo, "loading ModernBERT sentiment weights");

        let config_path = HfLoader::new(repo, "config.json").load()?;
        let weights_path = HfLoader::new(repo, "model.safetensors").load()?;

        let config: Config = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
        let labels = class_labels(&config)?;

        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? };
        let model = CandleModernBertForSequenceClassification::load(vb, &config)?;

        Ok(Self {
            model,
            device,
            labels,
        })
    }

    pub fn get_tokenizer(size: ModernBertSize) -> Result<Tokenizer> {
        TokenizerLoader::new(size.sentiment_repo(), "tokenizer.json").load()
    }

    fn probabilities(&self, tokenizer: &Tokenizer, text: &str) -> Result<Vec<f32>> {
        let tokens = tokenizer.encode(text, true).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Tokenization failed on '{}': {e}",
                text.chars().take(50).collect::<String>()
            ))
        })?;

        let input_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = self.model.forward(&input_ids, &attention_mask)?;
        let probs = softmax(&logits, D::Minus1)?.squeeze(0)?;
        Ok(probs.to_vec1::<f32>()?)
    }
}

impl SentimentAnalysisModel for SentimentModernBertModel {
    type Options = ModernBertSize;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        SentimentModernBertModel::new(options, device)
    }

    fn class_probabilities(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
    ) -> Result<Vec<(String, f32)>> {
        let probs = self.probabilities(tokenizer, text)?;
        if probs.len() != self.labels.len() {
            return Err(PipelineError::ModelFormat(format!(
                "Classifier produced {} scores for {} labels",
                probs.len(),
                self.labels.len()
            )));
        }
        Ok(self.labels.iter().cloned().zip(probs).collect())
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        SentimentModernBertModel::get_tokenizer(options)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

/// Class labels ordered by class id, taken from the model's `id2label`.
fn class_labels(config: &Config) -> Result<Vec<String>> {
    let id2label = config
        .classifier_config
        .as_ref()
        .map(|c| &c.id2label)
        .ok_or_else(|| PipelineError::ModelFormat("config.json has no id2label".into()))?;

    let labels = ordered_labels(id2label)?;
    if !labels.iter().any(|l| is_positive_label(l)) || !labels.iter().any(|l| is_negative_label(l))
    {
        return Err(PipelineError::ModelFormat(format!(
            "Sentiment model needs positive and negative classes, found: {}",
            labels.join(", ")
        )));
    }
    Ok(labels)
}

fn ordered_labels(id2label: &HashMap<String, String>) -> Result<Vec<String>> {
    let mut indexed = id2label
        .iter()
        .map(|(id, label)| {
            id.parse::<usize>()
                .map(|id| (id, label.clone()))
                .map_err(|_| PipelineError::ModelFormat(format!("Non-numeric class id '{id}'")))
        })
        .collect::<Result<Vec<_>>>()?;
    indexed.sort_by_key(|(id, _)| *id);

    if indexed.iter().enumerate().any(|(position, (id, _))| position != *id) {
        return Err(PipelineError::ModelFormat(
            "Class ids in id2label are not contiguous from 0".into(),
        ));
    }
    Ok(indexed.into_iter().map(|(_, label)| label).collect())
}
