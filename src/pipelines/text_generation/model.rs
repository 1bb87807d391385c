use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

use crate::core::{GenerationConfig, ModelOptions, Result};

/// Per-call inference state such as a KV cache and the current position.
pub trait LanguageModelContext {
    /// Run `input` (shape `1 x seq_len`) through the model and return the
    /// logits of the last position (shape `1 x vocab`).
    fn generate(&mut self, input: &Tensor) -> candle_core::Result<Tensor>;

    /// Number of tokens processed so far.
    fn position(&self) -> usize;
}

/// A causal language model usable by [`TextGenerationPipeline`](super::TextGenerationPipeline).
pub trait TextGenerationModel {
    type Options: ModelOptions + std::fmt::Debug + Clone;
    type Context: LanguageModelContext;

    fn new(options: Self::Options, device: Device) -> Result<Self>
    where
        Self: Sized;

    fn get_tokenizer(&self) -> Result<Tokenizer>;

    /// Wrap a raw user prompt in the model's chat format.
    fn apply_chat_template(&self, prompt: &str) -> Result<String>;

    fn get_eos_tokens(&self) -> Vec<u32>;

    fn get_max_seq_len(&self) -> usize;

    /// Sampling defaults shipped with the model.
    fn generation_config(&self) -> &GenerationConfig;

    /// A fresh context with an empty KV cache.
    fn new_context(&self) -> Self::Context;

    fn device(&self) -> &Device;
}
