use super::analyzer::PolarityAnalyzer;
use crate::core::{PipelineError, Result, SentimentLabel};

/// Polarity strictly above this value is classified as positive.
pub const POSITIVE_THRESHOLD: f64 = 0.1;

/// Polarity strictly below this value is classified as negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

/// Map a polarity score onto a sentiment label.
///
/// Both thresholds are exclusive, so `0.1` and `-0.1` are neutral. A NaN score
/// is neutral as well.
pub fn classify_polarity(score: f64) -> SentimentLabel {
    if score > POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if score < NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Classifies text into [`SentimentLabel`]s using a [`PolarityAnalyzer`].
///
/// ```rust
/// use sentiment_textgen::{PolarityAnalyzer, Result, SentimentClassifier, SentimentLabel};
///
/// struct Fixed(f64);
///
/// impl PolarityAnalyzer for Fixed {
///     fn polarity(&self, _text: &str) -> Result<f64> {
///         Ok(self.0)
///     }
/// }
///
/// let classifier = SentimentClassifier::new(Fixed(0.8));
/// assert_eq!(classifier.classify("great")?, SentimentLabel::Positive);
/// assert_eq!(classifier.classify("")?, SentimentLabel::Neutral);
/// # Ok::<(), sentiment_textgen::PipelineError>(())
/// ```
pub struct SentimentClassifier<A> {
    analyzer: A,
}

impl<A: PolarityAnalyzer> SentimentClassifier<A> {
    pub fn new(analyzer: A) -> Self {
        Self { analyzer }
    }

    /// Classify `text`.
    ///
    /// Empty input is neutral and never reaches the analyzer. Analyzer failures
    /// are returned as [`PipelineError::Analysis`].
    pub fn classify(&self, text: &str) -> Result<SentimentLabel> {
        if text.is_empty() {
            return Ok(SentimentLabel::Neutral);
        }

        let score = self
            .analyzer
            .polarity(text)
            .map_err(PipelineError::analysis)?;
        Ok(classify_polarity(score))
    }

    /// Like [`classify`](Self::classify), treating absent input as empty.
    pub fn classify_opt(&self, text: Option<&str>) -> Result<SentimentLabel> {
        self.classify(text.unwrap_or_default())
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn into_inner(self) -> A {
        self.analyzer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Returns a fixed score and records every text it was asked about.
    struct RecordingAnalyzer {
        score: f64,
        calls: RefCell<Vec<String>>,
    }

    impl RecordingAnalyzer {
        fn new(score: f64) -> Self {
            Self {
                score,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PolarityAnalyzer for RecordingAnalyzer {
        fn polarity(&self, text: &str) -> Result<f64> {
            self.calls.borrow_mut().push(text.to_string());
            Ok(self.score)
        }
    }

    struct BrokenAnalyzer;

    impl PolarityAnalyzer for BrokenAnalyzer {
        fn polarity(&self, _text: &str) -> Result<f64> {
            Err(PipelineError::Unavailable("analyzer offline".into()))
        }
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(classify_polarity(0.1), SentimentLabel::Neutral);
        assert_eq!(classify_polarity(-0.1), SentimentLabel::Neutral);
        assert_eq!(classify_polarity(0.0), SentimentLabel::Neutral);
        assert_eq!(classify_polarity(0.100_001), SentimentLabel::Positive);
        assert_eq!(classify_polarity(-0.100_001), SentimentLabel::Negative);
        assert_eq!(classify_polarity(1.0), SentimentLabel::Positive);
        assert_eq!(classify_polarity(-1.0), SentimentLabel::Negative);
    }

    #[test]
    fn nan_polarity_is_neutral() {
        assert_eq!(classify_polarity(f64::NAN), SentimentLabel::Neutral);
    }

    #[test]
    fn empty_text_skips_analyzer() {
        let classifier = SentimentClassifier::new(RecordingAnalyzer::new(0.9));

        assert_eq!(classifier.classify("").unwrap(), SentimentLabel::Neutral);
        assert_eq!(classifier.classify_opt(None).unwrap(), SentimentLabel::Neutral);
        assert!(classifier.analyzer().calls.borrow().is_empty());
    }

    #[test]
    fn full_text_is_scored_once() {
        let classifier = SentimentClassifier::new(RecordingAnalyzer::new(-0.6));

        let label = classifier.classify("This is awful, truly.").unwrap();

        assert_eq!(label, SentimentLabel::Negative);
        assert_eq!(
            *classifier.analyzer().calls.borrow(),
            vec!["This is awful, truly.".to_string()]
        );

        let analyzer = classifier.into_inner();
        assert_eq!(analyzer.calls.into_inner(), vec!["This is awful, truly.".to_string()]);
    }

    #[test]
    fn whitespace_and_punctuation_still_get_a_label() {
        let classifier = SentimentClassifier::new(RecordingAnalyzer::new(0.0));

        for text in ["   ", "\n\t", "?!...", "--"] {
            let label = classifier.classify(text).unwrap();
            assert!(SentimentLabel::ALL.contains(&label));
        }
        assert_eq!(classifier.analyzer().calls.borrow().len(), 4);
    }

    #[test]
    fn analyzer_failure_propagates() {
        let classifier = SentimentClassifier::new(BrokenAnalyzer);

        let err = classifier.classify("anything").unwrap_err();

        assert!(matches!(err, PipelineError::Analysis(_)));
        assert!(matches!(err.root_cause(), PipelineError::Unavailable(_)));
    }

    #[test]
    fn classifier_accepts_borrowed_analyzers() {
        let analyzer = RecordingAnalyzer::new(0.4);
        let classifier = SentimentClassifier::new(&analyzer);

        assert_eq!(classifier.classify("nice").unwrap(), SentimentLabel::Positive);
        assert_eq!(analyzer.calls.borrow().len(), 1);
    }
}
