//! The caller-side flow around classification and generation.
//!
//! A [`SentimentTextSession`] takes what a user typed (a prompt, a sentiment
//! choice and a length) and turns it into display-ready text: it guards the
//! prompt, resolves the sentiment, checks the length against the
//! application's bounds, generates, and cleans up whitespace.

use serde::Serialize;

use crate::core::{PipelineError, Result, SentimentChoice, SentimentLabel};
use crate::pipelines::sentiment::{PolarityAnalyzer, SentimentClassifier};
use crate::pipelines::text_generation::{PromptComposer, TextGenerator};

/// Inclusive range of generation lengths a session accepts, plus the length
/// offered when the user does not pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LengthBounds {
    min: usize,
    max: usize,
    default: usize,
}

impl LengthBounds {
    pub fn new(min: usize, max: usize, default: usize) -> Result<Self> {
        if min == 0 {
            return Err(PipelineError::InvalidParams(
                "minimum length must be at least 1".into(),
            ));
        }
        if min > max || !(min..=max).contains(&default) {
            return Err(PipelineError::InvalidParams(format!(
                "length bounds must satisfy min <= default <= max, got {min} <= {default} <= {max}"
            )));
        }
        Ok(Self { min, max, default })
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn default_length(&self) -> usize {
        self.default
    }

    pub fn contains(&self, length: usize) -> bool {
        (self.min..=self.max).contains(&length)
    }

    fn check(&self, length: usize) -> Result<()> {
        if self.contains(length) {
            Ok(())
        } else {
            Err(PipelineError::InvalidParams(format!(
                "length {length} is outside the allowed range {}..={}",
                self.min, self.max
            )))
        }
    }
}

impl Default for LengthBounds {
    fn default() -> Self {
        Self {
            min: 50,
            max: 500,
            default: 150,
        }
    }
}

/// What a session run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOutcome {
    /// The sentiment the text was steered towards.
    pub sentiment: SentimentLabel,
    /// `true` when the sentiment came from the classifier rather than the user.
    pub detected: bool,
    /// Generated text with whitespace normalized, ready for display.
    pub text: String,
    /// Generated text exactly as the generator returned it.
    pub raw: String,
}

/// Ties a sentiment analyzer and a text generator together.
pub struct SentimentTextSession<A, G> {
    classifier: SentimentClassifier<A>,
    generator: G,
    composer: PromptComposer,
    bounds: LengthBounds,
}

impl<A: PolarityAnalyzer, G: TextGenerator> SentimentTextSession<A, G> {
    pub fn new(analyzer: A, generator: G) -> Self {
        Self {
            classifier: SentimentClassifier::new(analyzer),
            generator,
            composer: PromptComposer::default(),
            bounds: LengthBounds::default(),
        }
    }

    /// Use `composer` to build generator prompts.
    pub fn composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    /// Accept generation lengths within `bounds`.
    pub fn length_bounds(mut self, bounds: LengthBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn bounds(&self) -> LengthBounds {
        self.bounds
    }

    /// Resolve the sentiment to steer towards.
    ///
    /// A manual choice is used as is and the analyzer is not consulted. Returns
    /// the label and whether it was detected.
    pub fn resolve_sentiment(
        &self,
        prompt: &str,
        choice: SentimentChoice,
    ) -> Result<(SentimentLabel, bool)> {
        match choice {
            SentimentChoice::Manual(label) => Ok((label, false)),
            SentimentChoice::Auto => Ok((self.classifier.classify(prompt)?, true)),
        }
    }

    /// Generate display-ready text for `prompt`.
    pub fn run(
        &self,
        prompt: &str,
        choice: SentimentChoice,
        max_length: usize,
    ) -> Result<GenerationOutcome> {
        if prompt.is_empty() {
            return Err(PipelineError::InvalidInput("Please enter a prompt".into()));
        }
        self.bounds.check(max_length)?;

        let (sentiment, detected) = self.resolve_sentiment(prompt, choice)?;
        tracing::info!(%sentiment, detected, max_length, "resolved sentiment");

        let raw = self
            .composer
            .generate(prompt, sentiment, max_length, &self.generator)?;
        let text = normalize_whitespace(&raw);

        Ok(GenerationOutcome {
            sentiment,
            detected,
            text,
            raw,
        })
    }
}

/// Replace newlines with spaces, trim, and collapse whitespace runs to a
/// single space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingAnalyzer {
        score: f64,
        calls: Cell<usize>,
    }

    impl CountingAnalyzer {
        fn new(score: f64) -> Self {
            Self {
                score,
                calls: Cell::new(0),
            }
        }
    }

    impl PolarityAnalyzer for CountingAnalyzer {
        fn polarity(&self, _text: &str) -> Result<f64> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.score)
        }
    }

    struct Echo;

    impl TextGenerator for Echo {
        fn generate(&self, prompt: &str, _max_length: usize) -> Result<String> {
            Ok(format!("{prompt}\n\n  and  more"))
        }
    }

    #[test]
    fn whitespace_is_normalized() {
        assert_eq!(normalize_whitespace("  a\nb \n\n c\t d  "), "a b c d");
        assert_eq!(normalize_whitespace("\n\n"), "");
    }

    #[test]
    fn default_bounds() {
        let bounds = LengthBounds::default();
        assert_eq!(bounds.min(), 50);
        assert_eq!(bounds.max(), 500);
        assert_eq!(bounds.default_length(), 150);
        assert!(bounds.contains(50) && bounds.contains(500));
        assert!(!bounds.contains(49) && !bounds.contains(501));
    }

    #[test]
    fn inconsistent_bounds_are_rejected() {
        assert!(LengthBounds::new(100, 50, 75).is_err());
        assert!(LengthBounds::new(10, 50, 60).is_err());
        assert!(LengthBounds::new(0, 50, 10).is_err());
        assert!(LengthBounds::new(10, 50, 10).is_ok());
    }

    #[test]
    fn manual_choice_skips_analyzer() {
        let session = SentimentTextSession::new(CountingAnalyzer::new(0.9), Echo);
        let outcome = session
            .run("Rainy afternoon", SentimentChoice::Manual(SentimentLabel::Negative), 150)
            .unwrap();

        assert_eq!(outcome.sentiment, SentimentLabel::Negative);
        assert!(!outcome.detected);
        assert_eq!(session.classifier.analyzer().calls.get(), 0);
    }

    #[test]
    fn auto_choice_detects_sentiment() {
        let session = SentimentTextSession::new(CountingAnalyzer::new(0.9), Echo);
        let outcome = session.run("Sunny day", SentimentChoice::Auto, 150).unwrap();

        assert_eq!(outcome.sentiment, SentimentLabel::Positive);
        assert!(outcome.detected);
        assert!(outcome.text.ends_with("Sunny day and more"));
        assert!(outcome.raw.contains('\n'));
    }

    #[test]
    fn empty_prompt_is_rejected_before_anything_runs() {
        let session = SentimentTextSession::new(CountingAnalyzer::new(0.0), Echo);
        let err = session.run("", SentimentChoice::Auto, 150).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert_eq!(session.classifier.analyzer().calls.get(), 0);
    }

    #[test]
    fn out_of_bounds_length_is_rejected() {
        let session = SentimentTextSession::new(CountingAnalyzer::new(0.0), Echo);
        let err = session.run("hello", SentimentChoice::Auto, 10).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParams(_)));

        let session = session.length_bounds(LengthBounds::new(5, 20, 10).unwrap());
        assert!(session.run("hello", SentimentChoice::Auto, 10).is_ok());
    }
}
