pub mod cache;
pub mod config;
pub mod error;
pub mod sentiment;

pub use cache::{global_cache, ModelCache, ModelOptions};
pub use config::GenerationConfig;
pub use error::{PipelineError, Result};
pub use sentiment::{SentimentChoice, SentimentLabel};
