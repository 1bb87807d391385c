use candle_transformers::generation::{LogitsProcessor, Sampling};

use crate::core::{GenerationConfig, PipelineError, Result};

pub use candle_transformers::utils::apply_repeat_penalty;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_REPEAT_PENALTY: f32 = 1.1;
pub const DEFAULT_REPEAT_LAST_N: usize = 64;

/// User overrides for generation parameters.
/// Only set fields override the model's `generation_config.json`.
#[derive(Debug, Clone, Default)]
pub struct GenerationOverrides {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<usize>,
    pub repeat_penalty: Option<f32>,
    pub repeat_last_n: Option<usize>,
    pub seed: Option<u64>,
}

/// Resolved parameters controlling sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Randomness of sampling. `0.0` means greedy decoding.
    pub temperature: f64,
    /// Nucleus sampling cutoff. `None` disables it.
    pub top_p: Option<f64>,
    /// Only sample among the `k` most likely tokens. `None` disables it.
    pub top_k: Option<usize>,
    /// Penalty for repeating tokens. `1.0` means no penalty.
    pub repeat_penalty: f32,
    /// Number of recent tokens the repeat penalty looks at.
    pub repeat_last_n: usize,
    pub seed: u64,
}

impl GenerationParams {
    /// Resolve parameters from a model config and user overrides.
    ///
    /// Overrides win over the config, and the config wins over crate defaults.
    /// Without a seed from either side a random one is drawn.
    pub fn resolve(config: &GenerationConfig, overrides: &GenerationOverrides) -> Self {
        let top_p = overrides
            .top_p
            .or(config.top_p)
            .filter(|p| *p > 0.0 && *p < 1.0);
        let top_k = overrides
            .top_k
            .or(config.top_k.map(|k| k as usize))
            .filter(|k| *k > 0);

        Self {
            temperature: overrides
                .temperature
                .or(config.temperature)
                .unwrap_or(DEFAULT_TEMPERATURE),
            top_p,
            top_k,
            repeat_penalty: overrides
                .repeat_penalty
                .or(config.repeat_penalty)
                .unwrap_or(DEFAULT_REPEAT_PENALTY),
            repeat_last_n: overrides
                .repeat_last_n
                .or(config.repeat_last_n)
                .unwrap_or(DEFAULT_REPEAT_LAST_N),
            seed: overrides.seed.unwrap_or_else(rand::random),
        }
    }

    /// Reject values the sampler cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(PipelineError::InvalidParams(format!(
                "temperature must be a finite value >= 0, got {}",
                self.temperature
            )));
        }
        if let Some(p) = self.top_p {
            if !(0.0..=1.0).contains(&p) {
                return Err(PipelineError::InvalidParams(format!(
                    "top_p must be within 0.0..=1.0, got {p}"
                )));
            }
        }
        if !self.repeat_penalty.is_finite() || self.repeat_penalty <= 0.0 {
            return Err(PipelineError::InvalidParams(format!(
                "repeat_penalty must be a positive value, got {}",
                self.repeat_penalty
            )));
        }
        Ok(())
    }

    /// The sampling strategy these parameters describe.
    pub fn sampling(&self) -> Sampling {
        let temperature = self.temperature;
        if temperature <= 0.0 {
            return Sampling::ArgMax;
        }

        match (self.top_k, self.top_p) {
            (Some(k), Some(p)) => Sampling::TopKThenTopP { k, p, temperature },
            (Some(k), None) => Sampling::TopK { k, temperature },
            (None, Some(p)) => Sampling::TopP { p, temperature },
            (None, None) => Sampling::All { temperature },
        }
    }

    pub fn logits_processor(&self) -> LogitsProcessor {
        LogitsProcessor::from_sampling(self.seed, self.sampling())
    }
}

/// How the `max_length` passed to a generator is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthMode {
    /// `max_length` bounds the number of newly generated tokens.
    #[default]
    NewTokens,
    /// `max_length` bounds prompt and generated tokens together.
    Total,
}

impl LengthMode {
    /// Number of tokens that may be generated for a prompt of `prompt_len` tokens.
    pub fn new_token_budget(self, prompt_len: usize, max_length: usize) -> Result<usize> {
        match self {
            LengthMode::NewTokens => Ok(max_length),
            LengthMode::Total => max_length
                .checked_sub(prompt_len)
                .filter(|budget| *budget > 0)
                .ok_or_else(|| {
                    PipelineError::InvalidParams(format!(
                        "prompt is {prompt_len} tokens, which leaves nothing to generate within max_length {max_length}"
                    ))
                }),
        }
    }
}
