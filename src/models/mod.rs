pub mod modernbert;
pub mod qwen3;

pub use modernbert::{ModernBertSize, SentimentModernBertModel};
pub use qwen3::{Qwen3Context, Qwen3Model, Qwen3Size};
