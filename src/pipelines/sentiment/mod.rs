//! Sentiment classification for steering text generation.
//!
//! A prompt's sentiment is derived from a polarity score in `[-1.0, 1.0]`:
//! above `0.1` is positive, below `-0.1` is negative and anything in between
//! (boundaries included) is neutral. Empty text is neutral without consulting
//! the analyzer at all.
//!
//! ## Main Types
//!
//! - [`SentimentClassifier`] - Thresholds polarity scores into a [`SentimentLabel`](crate::SentimentLabel)
//! - [`PolarityAnalyzer`] - Trait for anything that can score polarity
//! - [`SentimentAnalysisPipeline`] - ModernBERT-backed polarity analyzer
//! - [`SentimentAnalysisPipelineBuilder`] - Builder pattern for pipeline configuration
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sentiment_textgen::pipelines::sentiment::*;
//!
//! let pipeline = SentimentAnalysisPipelineBuilder::modernbert(ModernBertSize::Base)
//!     .cpu()
//!     .build()?;
//!
//! let classifier = SentimentClassifier::new(pipeline);
//! let label = classifier.classify("I absolutely love this new design, it's wonderful!")?;
//! println!("Sentiment: {label}");
//! # Ok::<(), sentiment_textgen::PipelineError>(())
//! ```

pub mod analyzer;
pub mod builder;
pub mod classifier;
pub mod model;
pub mod pipeline;

pub use analyzer::PolarityAnalyzer;
pub use builder::SentimentAnalysisPipelineBuilder;
pub use classifier::{
    classify_polarity, SentimentClassifier, NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD,
};
pub use model::SentimentAnalysisModel;
pub use pipeline::{SentimentAnalysisPipeline, SentimentResult};

pub use crate::models::ModernBertSize;
pub use crate::pipelines::utils::DeviceSelectable;

/// Only for generic annotations. Use [`SentimentAnalysisPipelineBuilder::modernbert`].
pub type SentimentModernBert = crate::models::SentimentModernBertModel;
