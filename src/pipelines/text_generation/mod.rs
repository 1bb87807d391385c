//! Sentiment-steered prompt composition and text generation.
//!
//! [`generate`] embeds a sentiment label into the user's prompt through a
//! [`PromptTemplate`] and calls a [`TextGenerator`] exactly once with the
//! result. The crate ships one model-backed generator, a quantized Qwen3
//! [`TextGenerationPipeline`].
//!
//! ## Main Types
//!
//! - [`PromptComposer`] - Renders a [`PromptTemplate`] and invokes the generator
//! - [`TextGenerator`] - Trait for anything that can continue a prompt
//! - [`TextGenerationPipeline`] - Candle-backed autoregressive generator
//! - [`TextGenerationPipelineBuilder`] - Builder for sampling and device options
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sentiment_textgen::pipelines::text_generation::*;
//! use sentiment_textgen::SentimentLabel;
//!
//! let pipeline = TextGenerationPipelineBuilder::qwen3(Qwen3Size::Size0_6B).build()?;
//!
//! let text = generate("The old lighthouse", SentimentLabel::Positive, 150, &pipeline)?;
//! println!("{text}");
//! # Ok::<(), sentiment_textgen::PipelineError>(())
//! ```

pub mod builder;
pub mod generator;
pub mod model;
pub mod params;
pub mod pipeline;
pub mod prompt;

pub use builder::TextGenerationPipelineBuilder;
pub use generator::TextGenerator;
pub use model::{LanguageModelContext, TextGenerationModel};
pub use params::{GenerationOverrides, GenerationParams, LengthMode};
pub use pipeline::TextGenerationPipeline;
pub use prompt::{generate, PromptComposer, PromptTemplate};

pub use crate::models::Qwen3Size;
pub use crate::pipelines::utils::DeviceSelectable;

/// Only for generic annotations. Use [`TextGenerationPipelineBuilder::qwen3`].
pub type Qwen3 = crate::models::Qwen3Model;
