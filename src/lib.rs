//! Sentiment-aligned text generation.
//!
//! Classify the sentiment of a short prompt from a polarity score, then steer a
//! language model towards that sentiment while it continues the prompt.
//!
//! The core logic talks to its models only through two traits,
//! [`PolarityAnalyzer`] and [`TextGenerator`], so any scorer or generator can be
//! plugged in. Model-backed implementations built on Candle live in
//! [`pipelines::sentiment`] (ModernBERT) and [`pipelines::text_generation`]
//! (quantized Qwen3).
//!
//! ```rust,no_run
//! use sentiment_textgen::pipelines::sentiment::{ModernBertSize, SentimentAnalysisPipelineBuilder};
//! use sentiment_textgen::pipelines::text_generation::{Qwen3Size, TextGenerationPipelineBuilder};
//! use sentiment_textgen::{SentimentChoice, SentimentTextSession};
//!
//! let analyzer = SentimentAnalysisPipelineBuilder::modernbert(ModernBertSize::Base).build()?;
//! let generator = TextGenerationPipelineBuilder::qwen3(Qwen3Size::Size0_6B).build()?;
//!
//! let session = SentimentTextSession::new(analyzer, generator);
//! let outcome = session.run("What a beautiful morning", SentimentChoice::Auto, 150)?;
//! println!("{}: {}", outcome.sentiment, outcome.text);
//! # Ok::<(), sentiment_textgen::PipelineError>(())
//! ```

pub mod core;
pub mod loaders;
pub mod models;
pub mod pipelines;
pub mod session;

pub use crate::core::{PipelineError, Result, SentimentChoice, SentimentLabel};

pub use pipelines::sentiment::{classify_polarity, PolarityAnalyzer, SentimentClassifier};
pub use pipelines::text_generation::{generate, PromptComposer, PromptTemplate, TextGenerator};

pub use session::{normalize_whitespace, GenerationOutcome, LengthBounds, SentimentTextSession};
