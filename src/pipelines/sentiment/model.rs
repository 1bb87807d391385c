use tokenizers::Tokenizer;

use crate::core::Result;

/// A sentiment classifier model with named output classes.
pub trait SentimentAnalysisModel {
    type Options: std::fmt::Debug + Clone;

    fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    /// Probability of every output class for `text`, in class-id order.
    fn class_probabilities(&self, tokenizer: &Tokenizer, text: &str)
        -> Result<Vec<(String, f32)>>;

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;

    fn device(&self) -> &candle_core::Device;
}
