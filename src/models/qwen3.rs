//! Quantized Qwen3 for text generation.
//!
//! Weights come from the unsloth GGUF quantizations on the Hugging Face Hub; the
//! tokenizer and sampling defaults come from the matching upstream Qwen repo.
//! The network itself is `candle-transformers`' `quantized_qwen3`.

use candle_core::{Device, Tensor};
use candle_transformers::models::quantized_qwen3::ModelWeights;
use minijinja::{context, Environment};
use tokenizers::Tokenizer;

use crate::core::{GenerationConfig, ModelOptions, PipelineError, Result};
use crate::loaders::{GenerationConfigLoader, GgufModelLoader, TokenizerLoader};
use crate::pipelines::text_generation::model::{LanguageModelContext, TextGenerationModel};

/// Context window used when the GGUF metadata does not declare one.
const DEFAULT_CONTEXT_LENGTH: usize = 40960;

const END_OF_TURN: &str = "<|im_end|>";

/// Single user turn followed by an assistant turn with thinking disabled.
const CHAT_TEMPLATE: &str = "<|im_start|>user\n{{ prompt }}<|im_end|>\n<|im_start|>assistant\n<think>\n\n</think>\n\n";

/// Available Qwen3 model sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qwen3Size {
    Size0_6B,
    Size1_7B,
    Size4B,
    Size8B,
    Size14B,
    Size32B,
}

impl Qwen3Size {
    fn tag(self) -> &'static str {
        match self {
            Qwen3Size::Size0_6B => "0.6B",
            Qwen3Size::Size1_7B => "1.7B",
            Qwen3Size::Size4B => "4B",
            Qwen3Size::Size8B => "8B",
            Qwen3Size::Size14B => "14B",
            Qwen3Size::Size32B => "32B",
        }
    }

    /// GGUF repository and file name.
    pub fn to_id(self) -> (String, String) {
        let tag = self.tag();
        (
            format!("unsloth/Qwen3-{tag}-GGUF"),
            format!("Qwen3-{tag}-Q4_K_M.gguf"),
        )
    }

    /// Upstream repository holding the tokenizer and generation config.
    pub fn base_repo(self) -> String {
        format!("Qwen/Qwen3-{}", self.tag())
    }
}

impl std::fmt::Display for Qwen3Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "qwen3-{}", self.tag().to_lowercase())
    }
}

impl ModelOptions for Qwen3Size {
    fn cache_key(&self) -> String {
        self.to_string()
    }
}

/// Quantized Qwen3 weights plus everything needed to drive them.
///
/// The weights are a template: every generation call clones them into a
/// [`Qwen3Context`] with its own KV cache. The quantized tensors themselves
/// are shared between clones.
pub struct Qwen3Model {
    weights: ModelWeights,
    tokenizer: Tokenizer,
    generation_config: GenerationConfig,
    chat_env: Environment<'static>,
    eos_tokens: Vec<u32>,
    max_seq_len: usize,
    device: Device,
}

impl Qwen3Model {
    pub fn from_hf(size: Qwen3Size, device: Device) -> Result<Self> {
        let (repo_id, file_name) = size.to_id();
        let base_repo = size.base_repo();
        tracing::debug!(repo = %repo_id, file = %file_name, "loading Qwen3 weights");

        let (mut file, content) = GgufModelLoader::new(&repo_id, &file_name).load()?;

        let max_seq_len = match content.metadata.get("qwen3.context_length") {
            Some(value) => value.to_u32()? as usize,
            None => DEFAULT_CONTEXT_LENGTH,
        };

        let weights = ModelWeights::from_gguf(content, &mut file, &device)?;

        let generation_config =
            GenerationConfigLoader::new(&base_repo, "generation_config.json").load()?;
        let tokenizer = TokenizerLoader::new(&base_repo, "tokenizer.json").load()?;
        let eos_tokens = eos_tokens(&generation_config, &tokenizer)?;

        let mut chat_env = Environment::new();
        chat_env.set_keep_trailing_newline(true);
        chat_env.add_template("chat", CHAT_TEMPLATE)?;

        Ok(Self {
            weights,
            tokenizer,
            generation_config,
            chat_env,
            eos_tokens,
            max_seq_len,
            device,
        })
    }
}

/// EOS ids from the generation config, or the end-of-turn marker when the
/// config lists none.
fn eos_tokens(config: &GenerationConfig, tokenizer: &Tokenizer) -> Result<Vec<u32>> {
    if !config.eos_token_ids.is_empty() {
        return config
            .eos_token_ids
            .iter()
            .map(|&id| {
                u32::try_from(id).map_err(|_| {
                    PipelineError::ModelFormat(format!("EOS token id {id} is out of range"))
                })
            })
            .collect();
    }

    tokenizer
        .token_to_id(END_OF_TURN)
        .map(|id| vec![id])
        .ok_or_else(|| {
            PipelineError::ModelFormat(format!(
                "No EOS token configured and tokenizer has no '{END_OF_TURN}'"
            ))
        })
}

/// One generation's worth of Qwen3 state.
pub struct Qwen3Context {
    weights: ModelWeights,
    position: usize,
}

impl LanguageModelContext for Qwen3Context {
    fn generate(&mut self, input: &Tensor) -> candle_core::Result<Tensor> {
        let seq_len = input.dim(1)?;
        let logits = self.weights.forward(input, self.position)?;
        self.position += seq_len;
        Ok(logits)
    }

    fn position(&self) -> usize {
        self.position
    }
}

impl TextGenerationModel for Qwen3Model {
    type Options = Qwen3Size;
    type Context = Qwen3Context;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        Qwen3Model::from_hf(options, device)
    }

    fn get_tokenizer(&self) -> Result<Tokenizer> {
        Ok(self.tokenizer.clone())
    }

    fn apply_chat_template(&self, prompt: &str) -> Result<String> {
        let rendered = self
            .chat_env
            .get_template("chat")?
            .render(context! { prompt => prompt })?;
        Ok(rendered)
    }

    fn get_eos_tokens(&self) -> Vec<u32> {
        self.eos_tokens.clone()
    }

    fn get_max_seq_len(&self) -> usize {
        self.max_seq_len
    }

    fn generation_config(&self) -> &GenerationConfig {
        &self.generation_config
    }

    fn new_context(&self) -> Qwen3Context {
        let mut weights = self.weights.clone();
        weights.clear_kv_cache();
        Qwen3Context {
            weights,
            position: 0,
        }
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_map_to_gguf_and_base_repos() {
        let (repo, file) = Qwen3Size::Size0_6B.to_id();
        assert_eq!(repo, "unsloth/Qwen3-0.6B-GGUF");
        assert_eq!(file, "Qwen3-0.6B-Q4_K_M.gguf");
        assert_eq!(Qwen3Size::Size14B.base_repo(), "Qwen/Qwen3-14B");
    }

    #[test]
    fn cache_key_is_lowercase_name() {
        assert_eq!(Qwen3Size::Size1_7B.cache_key(), "qwen3-1.7b");
    }

    #[test]
    fn chat_template_disables_thinking() {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_template("chat", CHAT_TEMPLATE).unwrap();
        let rendered = env
            .get_template("chat")
            .unwrap()
            .render(context! { prompt => "Hi there" })
            .unwrap();

        assert!(rendered.starts_with("<|im_start|>user\nHi there<|im_end|>\n"));
        assert!(rendered.ends_with("<|im_start|>assistant\n<think>\n\n</think>\n\n"));
    }
}
