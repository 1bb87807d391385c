use super::model::TextGenerationModel;
use super::params::{GenerationOverrides, GenerationParams, LengthMode};
use super::pipeline::TextGenerationPipeline;
use crate::core::{global_cache, Result};
use crate::pipelines::utils::{build_cache_key, DeviceRequest, DeviceSelectable};

/// Builder for [`TextGenerationPipeline`].
///
/// Unset sampling parameters fall back to the model's `generation_config.json`
/// and then to crate defaults.
///
/// ```rust,no_run
/// use sentiment_textgen::pipelines::text_generation::*;
///
/// let pipeline = TextGenerationPipelineBuilder::qwen3(Qwen3Size::Size0_6B)
///     .temperature(0.7)
///     .seed(42)
///     .build()?;
///
/// let text = pipeline.completion("The harbor at dawn", 120)?;
/// # Ok::<(), sentiment_textgen::PipelineError>(())
/// ```
pub struct TextGenerationPipelineBuilder<M: TextGenerationModel> {
    options: M::Options,
    overrides: GenerationOverrides,
    length_mode: LengthMode,
    device_request: DeviceRequest,
}

impl<M: TextGenerationModel> TextGenerationPipelineBuilder<M> {
    pub fn new(options: M::Options) -> Self {
        Self {
            options,
            overrides: GenerationOverrides::default(),
            length_mode: LengthMode::default(),
            device_request: DeviceRequest::Default,
        }
    }

    /// Set the sampling temperature. `0.0` means greedy decoding.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.overrides.temperature = Some(temperature);
        self
    }

    /// Nucleus sampling cutoff.
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.overrides.top_p = Some(top_p);
        self
    }

    /// Only sample among the `top_k` most likely tokens.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.overrides.top_k = Some(top_k);
        self
    }

    /// Set the repeat penalty.
    ///
    /// Values > 1.0 discourage repetition, values < 1.0 encourage it.
    pub fn repeat_penalty(mut self, repeat_penalty: f32) -> Self {
        self.overrides.repeat_penalty = Some(repeat_penalty);
        self
    }

    /// Number of previous tokens considered by the repeat penalty.
    pub fn repeat_last_n(mut self, repeat_last_n: usize) -> Self {
        self.overrides.repeat_last_n = Some(repeat_last_n);
        self
    }

    /// Fix the random seed for reproducible generation (default: random).
    pub fn seed(mut self, seed: u64) -> Self {
        self.overrides.seed = Some(seed);
        self
    }

    /// Choose how `max_length` is counted (default: [`LengthMode::NewTokens`]).
    pub fn length_mode(mut self, length_mode: LengthMode) -> Self {
        self.length_mode = length_mode;
        self
    }

    pub fn build(self) -> Result<TextGenerationPipeline<M>>
    where
        M: Send + Sync + 'static,
    {
        let device = self.device_request.resolve()?;
        let key = build_cache_key(&self.options, &device);
        let options = self.options;
        let model = global_cache().get_or_create(&key, || M::new(options, device))?;

        let params = GenerationParams::resolve(model.generation_config(), &self.overrides);
        params.validate()?;
        let tokenizer = model.get_tokenizer()?;

        Ok(TextGenerationPipeline {
            model,
            tokenizer,
            params,
            length_mode: self.length_mode,
        })
    }
}

impl<M: TextGenerationModel> DeviceSelectable for TextGenerationPipelineBuilder<M> {
    fn device_request_mut(&mut self) -> &mut DeviceRequest {
        &mut self.device_request
    }
}

impl TextGenerationPipelineBuilder<crate::models::Qwen3Model> {
    pub fn qwen3(size: crate::models::Qwen3Size) -> Self {
        Self::new(size)
    }
}
