use std::sync::Arc;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

use super::generator::TextGenerator;
use super::model::{LanguageModelContext, TextGenerationModel};
use super::params::{apply_repeat_penalty, GenerationParams, LengthMode};
use crate::core::{PipelineError, Result};

/// Generates text continuations with a causal language model.
///
/// Every call starts from a fresh context, so calls are independent and the
/// pipeline can be shared across threads. Construct with
/// [`TextGenerationPipelineBuilder`](super::TextGenerationPipelineBuilder).
pub struct TextGenerationPipeline<M: TextGenerationModel> {
    pub(crate) model: Arc<M>,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) params: GenerationParams,
    pub(crate) length_mode: LengthMode,
}

impl<M: TextGenerationModel> TextGenerationPipeline<M> {
    /// Generate a continuation of `prompt`.
    ///
    /// The prompt is wrapped in the model's chat format before tokenization.
    /// How `max_length` is counted depends on the configured [`LengthMode`].
    pub fn completion(&self, prompt: &str, max_length: usize) -> Result<String> {
        if max_length == 0 {
            return Err(PipelineError::InvalidParams(
                "max_length must be greater than zero".into(),
            ));
        }

        let formatted = self.model.apply_chat_template(prompt)?;
        let prompt_tokens = self.encode(&formatted)?;

        let budget = self
            .length_mode
            .new_token_budget(prompt_tokens.len(), max_length)?;
        let room = self
            .model
            .get_max_seq_len()
            .saturating_sub(prompt_tokens.len());
        if room == 0 {
            return Err(PipelineError::InvalidParams(format!(
                "prompt is {} tokens, which fills the model's context window of {}",
                prompt_tokens.len(),
                self.model.get_max_seq_len()
            )));
        }
        let budget = budget.min(room);

        tracing::debug!(
            prompt_tokens = prompt_tokens.len(),
            max_new_tokens = budget,
            seed = self.params.seed,
            "starting generation"
        );

        let mut context = self.model.new_context();
        let generated = generate_tokens(
            &mut context,
            &prompt_tokens,
            budget,
            &self.params,
            &self.model.get_eos_tokens(),
            self.model.device(),
        )?;

        tracing::debug!(generated_tokens = generated.len(), "generation finished");

        self.tokenizer
            .decode(&generated, true)
            .map_err(|e| PipelineError::Tokenization(format!("Failed to decode output: {e}")))
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn length_mode(&self) -> LengthMode {
        self.length_mode
    }

    pub fn device(&self) -> &Device {
        self.model.device()
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self.tokenizer.encode(text, true).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Tokenization failed on '{}': {e}",
                text.chars().take(50).collect::<String>()
            ))
        })?;
        Ok(encoding.get_ids().to_vec())
    }
}

impl<M: TextGenerationModel> TextGenerator for TextGenerationPipeline<M> {
    fn generate(&self, prompt: &str, max_length: usize) -> Result<String> {
        self.completion(prompt, max_length)
    }
}

/// Autoregressively sample up to `max_new_tokens` tokens after `prompt_tokens`.
///
/// The prompt is processed in one forward pass, then each sampled token is fed
/// back at the next position. Sampling stops at the first EOS token, which is
/// not included in the output.
pub(crate) fn generate_tokens<C: LanguageModelContext>(
    context: &mut C,
    prompt_tokens: &[u32],
    max_new_tokens: usize,
    params: &GenerationParams,
    eos_tokens: &[u32],
    device: &Device,
) -> Result<Vec<u32>> {
    if prompt_tokens.is_empty() {
        return Err(PipelineError::InvalidInput(
            "cannot generate from an empty token sequence".into(),
        ));
    }

    let mut logits_processor = params.logits_processor();
    let mut generated: Vec<u32> = Vec::with_capacity(max_new_tokens);
    if max_new_tokens == 0 {
        return Ok(generated);
    }

    // 1 x L (batch and seq_len)
    let input = Tensor::new(prompt_tokens, device)?.unsqueeze(0)?;
    // 1 x V -> V
    let mut logits = context.generate(&input)?.squeeze(0)?;

    loop {
        let start_at = generated.len().saturating_sub(params.repeat_last_n);
        let penalty_context = &generated[start_at..];

        let penalized = if params.repeat_penalty == 1. || penalty_context.is_empty() {
            logits
        } else {
            apply_repeat_penalty(&logits, params.repeat_penalty, penalty_context)?
        };

        let next_token = logits_processor.sample(&penalized)?;
        if eos_tokens.contains(&next_token) {
            break;
        }
        generated.push(next_token);
        if generated.len() >= max_new_tokens {
            break;
        }

        let input = Tensor::new(&[next_token], device)?.unsqueeze(0)?;
        logits = context.generate(&input)?.squeeze(0)?;
    }

    Ok(generated)
}
