use std::sync::Arc;

use tokenizers::Tokenizer;

use super::analyzer::PolarityAnalyzer;
use super::model::SentimentAnalysisModel;
use crate::core::{PipelineError, Result};

/// The top class predicted by a sentiment model.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentResult {
    /// Class label as named by the model (e.g. "positive").
    pub label: String,
    /// Probability of that class (0.0 to 1.0).
    pub score: f32,
}

/// Runs a sentiment classification model over text.
///
/// Besides the top-class [`predict`](Self::predict), the pipeline acts as a
/// [`PolarityAnalyzer`]: the polarity of a text is the probability mass of the
/// positive class minus that of the negative class.
///
/// Construct with [`SentimentAnalysisPipelineBuilder`](super::SentimentAnalysisPipelineBuilder).
pub struct SentimentAnalysisPipeline<M: SentimentAnalysisModel> {
    pub(crate) model: Arc<M>,
    pub(crate) tokenizer: Tokenizer,
}

impl<M: SentimentAnalysisModel> SentimentAnalysisPipeline<M> {
    /// Predict the most likely sentiment class and its probability.
    pub fn predict(&self, text: &str) -> Result<SentimentResult> {
        let scores = self.model.class_probabilities(&self.tokenizer, text)?;
        top_class(scores)
    }

    /// Polarity of `text` in `[-1.0, 1.0]`.
    pub fn polarity(&self, text: &str) -> Result<f64> {
        let scores = self.model.class_probabilities(&self.tokenizer, text)?;
        polarity_from_probabilities(&scores)
    }

    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}

impl<M: SentimentAnalysisModel> PolarityAnalyzer for SentimentAnalysisPipeline<M> {
    fn polarity(&self, text: &str) -> Result<f64> {
        SentimentAnalysisPipeline::polarity(self, text)
    }
}

fn top_class(scores: Vec<(String, f32)>) -> Result<SentimentResult> {
    scores
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(label, score)| SentimentResult { label, score })
        .ok_or_else(|| PipelineError::ModelFormat("Model returned no class scores".into()))
}

/// Whether a model class label names the positive class.
pub(crate) fn is_positive_label(label: &str) -> bool {
    label.to_lowercase().starts_with("pos")
}

/// Whether a model class label names the negative class.
pub(crate) fn is_negative_label(label: &str) -> bool {
    label.to_lowercase().starts_with("neg")
}

/// Fold class probabilities into a single polarity score.
///
/// Classes whose label starts with `pos` count towards the positive side and
/// those starting with `neg` towards the negative side; anything else (e.g.
/// `neutral`) contributes nothing.
pub(crate) fn polarity_from_probabilities(scores: &[(String, f32)]) -> Result<f64> {
    let mut positive = None;
    let mut negative = None;

    for (label, probability) in scores {
        let probability = f64::from(*probability);
        if is_positive_label(label) {
            *positive.get_or_insert(0.0) += probability;
        } else if is_negative_label(label) {
            *negative.get_or_insert(0.0) += probability;
        }
    }

    match (positive, negative) {
        (Some(positive), Some(negative)) => Ok((positive - negative).clamp(-1.0, 1.0)),
        _ => {
            let labels: Vec<&str> = scores.iter().map(|(label, _)| label.as_str()).collect();
            Err(PipelineError::ModelFormat(format!(
                "Model classes must include a positive and a negative label. Available: {}",
                labels.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[(&str, f32)]) -> Vec<(String, f32)> {
        values
            .iter()
            .map(|(label, score)| (label.to_string(), *score))
            .collect()
    }

    #[test]
    fn polarity_is_positive_minus_negative() {
        let probs = scores(&[("negative", 0.1), ("neutral", 0.2), ("positive", 0.7)]);
        let polarity = polarity_from_probabilities(&probs).unwrap();
        assert!((polarity - 0.6).abs() < 1e-6);
    }

    #[test]
    fn neutral_mass_pulls_polarity_to_zero() {
        let probs = scores(&[("NEGATIVE", 0.05), ("NEUTRAL", 0.9), ("POSITIVE", 0.05)]);
        let polarity = polarity_from_probabilities(&probs).unwrap();
        assert!(polarity.abs() < 1e-6);
    }

    #[test]
    fn missing_polarity_labels_is_format_error() {
        let probs = scores(&[("joy", 0.5), ("anger", 0.5)]);
        let err = polarity_from_probabilities(&probs).unwrap_err();
        assert!(matches!(err, PipelineError::ModelFormat(_)));
    }

    #[test]
    fn top_class_picks_highest_probability() {
        let probs = scores(&[("negative", 0.2), ("positive", 0.8)]);
        let result = top_class(probs).unwrap();
        assert_eq!(result.label, "positive");
        assert!((result.score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn top_class_of_nothing_is_an_error() {
        assert!(top_class(Vec::new()).is_err());
    }
}
