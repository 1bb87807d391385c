// End-to-end flow with stub collaborators.

use std::cell::{Cell, RefCell};

use sentiment_textgen::*;

/// Averages the polarity of the words it knows, like a small lexicon analyzer.
struct LexiconAnalyzer {
    calls: Cell<usize>,
}

impl LexiconAnalyzer {
    fn new() -> Self {
        Self {
            calls: Cell::new(0),
        }
    }

    fn word_polarity(word: &str) -> Option<f64> {
        match word {
            "love" => Some(0.5),
            "wonderful" => Some(1.0),
            "worst" => Some(-1.0),
            "interesting" => Some(0.5),
            _ => None,
        }
    }
}

impl PolarityAnalyzer for LexiconAnalyzer {
    fn polarity(&self, text: &str) -> Result<f64> {
        self.calls.set(self.calls.get() + 1);
        let scores: Vec<f64> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter_map(|word| Self::word_polarity(&word.to_lowercase()))
            .collect();
        if scores.is_empty() {
            return Ok(0.0);
        }
        Ok(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

#[derive(Default)]
struct RecordingGenerator {
    prompts: RefCell<Vec<String>>,
}

impl TextGenerator for RecordingGenerator {
    fn generate(&self, prompt: &str, _max_length: usize) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok("A continuation\nspanning   two lines.".to_string())
    }
}

fn run(prompt: &str, choice: SentimentChoice) -> anyhow::Result<(GenerationOutcome, Vec<String>, usize)> {
    let analyzer = LexiconAnalyzer::new();
    let generator = RecordingGenerator::default();
    let session = SentimentTextSession::new(&analyzer, &generator);

    let outcome = session.run(prompt, choice, 150)?;
    let prompts = generator.prompts.borrow().clone();
    Ok((outcome, prompts, analyzer.calls.get()))
}

#[test]
fn enthusiastic_prompt_is_positive() -> anyhow::Result<()> {
    let (outcome, prompts, analyzer_calls) = run(
        "I absolutely love this new design, it's wonderful!",
        SentimentChoice::Auto,
    )?;

    assert_eq!(outcome.sentiment, SentimentLabel::Positive);
    assert!(outcome.detected);
    assert_eq!(analyzer_calls, 1);
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("positive"));
    assert!(prompts[0].contains("I absolutely love this new design"));
    Ok(())
}

#[test]
fn complaint_is_negative() -> anyhow::Result<()> {
    let (outcome, prompts, _) = run(
        "This is the worst experience I have ever had.",
        SentimentChoice::Auto,
    )?;

    assert_eq!(outcome.sentiment, SentimentLabel::Negative);
    assert!(prompts[0].contains("negative"));
    Ok(())
}

#[test]
fn factual_statement_is_neutral() -> anyhow::Result<()> {
    let (outcome, prompts, _) = run(
        "The meeting is scheduled for 3pm on Tuesday.",
        SentimentChoice::Auto,
    )?;

    assert_eq!(outcome.sentiment, SentimentLabel::Neutral);
    assert!(prompts[0].contains("neutral"));
    Ok(())
}

#[test]
fn manual_sentiment_overrides_detection() -> anyhow::Result<()> {
    let (outcome, prompts, analyzer_calls) = run(
        "Quantum computing is interesting.",
        SentimentChoice::Manual(SentimentLabel::Negative),
    )?;

    assert_eq!(outcome.sentiment, SentimentLabel::Negative);
    assert!(!outcome.detected);
    assert_eq!(analyzer_calls, 0);
    assert!(prompts[0].contains("negative"));
    Ok(())
}

#[test]
fn output_is_cleaned_for_display() -> anyhow::Result<()> {
    let (outcome, _, _) = run("Quantum computing is interesting.", "auto".parse()?)?;

    assert_eq!(outcome.raw, "A continuation\nspanning   two lines.");
    assert_eq!(outcome.text, "A continuation spanning two lines.");
    Ok(())
}

#[test]
fn classifier_handles_degenerate_input() -> anyhow::Result<()> {
    let analyzer = LexiconAnalyzer::new();
    let classifier = SentimentClassifier::new(&analyzer);

    assert_eq!(classifier.classify("")?, SentimentLabel::Neutral);
    assert_eq!(analyzer.calls.get(), 0);

    assert_eq!(classifier.classify("   ")?, SentimentLabel::Neutral);
    assert_eq!(classifier.classify("?!...")?, SentimentLabel::Neutral);
    assert_eq!(analyzer.calls.get(), 2);
    Ok(())
}

#[test]
fn generation_failure_is_not_an_empty_string() {
    struct Offline;

    impl TextGenerator for Offline {
        fn generate(&self, _prompt: &str, _max_length: usize) -> Result<String> {
            Err(PipelineError::Unavailable("generator offline".into()))
        }
    }

    let session = SentimentTextSession::new(LexiconAnalyzer::new(), Offline);
    let err = session
        .run("Hello there", SentimentChoice::Auto, 150)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Generation(_)));
}
