//! Model and tokenizer loading utilities for Hugging Face Hub integration.
//!
//! This module provides loaders for downloading and loading the model components
//! the pipelines need from the Hugging Face Hub:
//! - Model weight files (GGUF format)
//! - Tokenizers (JSON format)
//! - Generation configuration files
//!
//! ## Main Types
//!
//! - [`HfLoader`] - Generic Hugging Face file loader with retry logic
//! - [`TokenizerLoader`] - Loads tokenizers from Hugging Face repositories
//! - [`GenerationConfigLoader`] - Loads generation configuration files
//! - [`GgufModelLoader`] - Loads GGUF format model weight files
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sentiment_textgen::loaders::{GgufModelLoader, TokenizerLoader};
//!
//! let tokenizer = TokenizerLoader::new("Qwen/Qwen3-0.6B", "tokenizer.json").load()?;
//! let (file, content) =
//!     GgufModelLoader::new("unsloth/Qwen3-0.6B-GGUF", "Qwen3-0.6B-Q4_K_M.gguf").load()?;
//! # Ok::<(), sentiment_textgen::PipelineError>(())
//! ```
//!
//! All loaders retry when the local Hub cache is locked by another process.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::core::{GenerationConfig, PipelineError, Result};

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    /// Download the file (or reuse the Hub cache) and return its local path.
    pub fn load(&self) -> Result<PathBuf> {
        let hf_api = hf_hub::api::sync::ApiBuilder::new().build()?;
        let hf_repo = hf_api.model(self.repo.clone());

        let mut attempt = 0;
        loop {
            match hf_repo.get(self.filename.as_str()) {
                Ok(path) => {
                    tracing::debug!(repo = %self.repo, file = %self.filename, "resolved hub file");
                    return Ok(path);
                }
                Err(e) => {
                    let lock_contention = e.to_string().contains("Lock acquisition failed");
                    if lock_contention && attempt + 1 < MAX_RETRIES {
                        // Back off exponentially while another process holds the lock.
                        let wait_time = Duration::from_millis(100 * (1 << attempt));
                        tracing::debug!(
                            repo = %self.repo,
                            file = %self.filename,
                            attempt,
                            "hub cache locked, retrying"
                        );
                        std::thread::sleep(wait_time);
                        attempt += 1;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenizerLoader {
    pub tokenizer_file_loader: HfLoader,
}

impl TokenizerLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            tokenizer_file_loader: HfLoader::new(repo, filename),
        }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let tokenizer_file_path = self.tokenizer_file_loader.load()?;

        Tokenizer::from_file(&tokenizer_file_path).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Failed to load tokenizer from '{}': {e}",
                tokenizer_file_path.display()
            ))
        })
    }
}

#[derive(Debug, Clone)]
pub struct GenerationConfigLoader {
    pub generation_config_file_loader: HfLoader,
}

#[derive(Deserialize)]
struct RawGenerationConfig {
    temperature: Option<f64>,
    top_p: Option<f64>,
    top_k: Option<u64>,
    #[serde(alias = "repetition_penalty")]
    repeat_penalty: Option<f32>,
    repeat_last_n: Option<usize>,
    #[serde(alias = "eos_token_id")]
    eos_token_ids: Option<serde_json::Value>,
}

impl GenerationConfigLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            generation_config_file_loader: HfLoader::new(repo, filename),
        }
    }

    pub fn load(&self) -> Result<GenerationConfig> {
        let generation_config_file_path = self.generation_config_file_loader.load()?;
        let content = std::fs::read_to_string(generation_config_file_path)?;
        parse_generation_config(&content)
    }
}

/// Parse the contents of a Hugging Face `generation_config.json`.
///
/// `eos_token_id` may be a single number or an array of numbers.
pub fn parse_generation_config(content: &str) -> Result<GenerationConfig> {
    let raw: RawGenerationConfig = serde_json::from_str(content)?;

    let eos_token_ids = match raw.eos_token_ids {
        Some(serde_json::Value::Number(n)) => vec![n
            .as_u64()
            .ok_or_else(|| PipelineError::ModelFormat(format!("Invalid EOS token ID: {n}")))?],
        Some(serde_json::Value::Array(arr)) => arr
            .into_iter()
            .map(|v| {
                v.as_u64().ok_or_else(|| {
                    PipelineError::ModelFormat(format!("Invalid EOS token ID in array: {v}"))
                })
            })
            .collect::<Result<Vec<_>>>()?,
        _ => Vec::new(),
    };

    Ok(GenerationConfig {
        temperature: raw.temperature,
        top_p: raw.top_p,
        top_k: raw.top_k,
        repeat_penalty: raw.repeat_penalty,
        repeat_last_n: raw.repeat_last_n,
        eos_token_ids,
    })
}

#[derive(Debug, Clone)]
pub struct GgufModelLoader {
    pub model_file_loader: HfLoader,
}

impl GgufModelLoader {
    pub fn new(model_repo: &str, model_filename: &str) -> Self {
        Self {
            model_file_loader: HfLoader::new(model_repo, model_filename),
        }
    }

    pub fn load(&self) -> Result<(std::fs::File, candle_core::quantized::gguf_file::Content)> {
        let model_file_path = self.model_file_loader.load()?;

        let mut file = std::fs::File::open(&model_file_path)?;
        let file_content = candle_core::quantized::gguf_file::Content::read(&mut file)
            .map_err(|e| e.with_path(model_file_path))?;

        Ok((file, file_content))
    }
}
