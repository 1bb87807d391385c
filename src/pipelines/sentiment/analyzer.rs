use std::sync::Arc;

use crate::core::Result;

/// Source of polarity scores for sentiment classification.
///
/// A polarity is a real number, conventionally in `[-1.0, 1.0]`, describing the
/// overall affective valence of a text: negative values lean negative, positive
/// values lean positive. Implementations must be deterministic for identical
/// input within a process.
pub trait PolarityAnalyzer {
    /// Score the polarity of `text`.
    fn polarity(&self, text: &str) -> Result<f64>;
}

impl<T: PolarityAnalyzer + ?Sized> PolarityAnalyzer for &T {
    fn polarity(&self, text: &str) -> Result<f64> {
        (**self).polarity(text)
    }
}

impl<T: PolarityAnalyzer + ?Sized> PolarityAnalyzer for Box<T> {
    fn polarity(&self, text: &str) -> Result<f64> {
        (**self).polarity(text)
    }
}

impl<T: PolarityAnalyzer + ?Sized> PolarityAnalyzer for Arc<T> {
    fn polarity(&self, text: &str) -> Result<f64> {
        (**self).polarity(text)
    }
}
