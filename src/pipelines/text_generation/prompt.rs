use std::borrow::Cow;

use minijinja::{context, Environment};
use once_cell::sync::Lazy;

use super::generator::TextGenerator;
use crate::core::{PipelineError, Result, SentimentLabel};

static PROMPT_ENV: Lazy<Environment<'static>> = Lazy::new(Environment::new);

const PREFIX_TEMPLATE: &str =
    "Write a {{ sentiment }} passage that continues the text below.\n\n{{ prompt }}";
const SUFFIX_TEMPLATE: &str =
    "{{ prompt }}\n\nContinue the text above in a {{ sentiment }} tone.";

const SAMPLE_PROMPT: &str = "__sample_prompt__";

/// A minijinja template turning a prompt and a sentiment into generator input.
///
/// Templates see two variables: `prompt` (the user text, inserted verbatim) and
/// `sentiment` (the lowercase label, e.g. `positive`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: Cow<'static, str>,
}

impl PromptTemplate {
    /// Instruction first, then the prompt. This is the default.
    pub fn prefix() -> Self {
        Self {
            source: Cow::Borrowed(PREFIX_TEMPLATE),
        }
    }

    /// Prompt first, then the instruction.
    pub fn suffix() -> Self {
        Self {
            source: Cow::Borrowed(SUFFIX_TEMPLATE),
        }
    }

    /// A user supplied template.
    ///
    /// The template must render and must embed both the prompt and the
    /// sentiment, otherwise [`PipelineError::InvalidParams`] is returned.
    pub fn custom(source: impl Into<Cow<'static, str>>) -> Result<Self> {
        let template = Self {
            source: source.into(),
        };
        template.validate()?;
        Ok(template)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn render(&self, prompt: &str, sentiment: SentimentLabel) -> Result<String> {
        let rendered = PROMPT_ENV.render_str(
            &self.source,
            context! {
                prompt => prompt,
                sentiment => sentiment.as_str(),
            },
        )?;
        Ok(rendered)
    }

    fn validate(&self) -> Result<()> {
        for sentiment in SentimentLabel::ALL {
            let rendered = self.render(SAMPLE_PROMPT, sentiment).map_err(|e| {
                PipelineError::InvalidParams(format!("Prompt template does not render: {e}"))
            })?;

            if !rendered.contains(SAMPLE_PROMPT) {
                return Err(PipelineError::InvalidParams(
                    "Prompt template must embed the prompt via {{ prompt }}".into(),
                ));
            }
            if !rendered.to_lowercase().contains(sentiment.as_str()) {
                return Err(PipelineError::InvalidParams(
                    "Prompt template must embed the sentiment via {{ sentiment }}".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::prefix()
    }
}

/// Builds sentiment-steered prompts and hands them to a [`TextGenerator`].
///
/// The composer is stateless apart from its template and never retries.
#[derive(Debug, Clone, Default)]
pub struct PromptComposer {
    template: PromptTemplate,
}

impl PromptComposer {
    pub fn new(template: PromptTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// The augmented prompt for `prompt` steered towards `sentiment`.
    pub fn compose(&self, prompt: &str, sentiment: SentimentLabel) -> Result<String> {
        self.template.render(prompt, sentiment)
    }

    /// Compose the augmented prompt and call `generator` once with it.
    ///
    /// The generator's output is returned unmodified. Its failures come back as
    /// [`PipelineError::Generation`].
    pub fn generate<G>(
        &self,
        prompt: &str,
        sentiment: SentimentLabel,
        max_length: usize,
        generator: &G,
    ) -> Result<String>
    where
        G: TextGenerator + ?Sized,
    {
        let augmented = self.compose(prompt, sentiment)?;
        tracing::debug!(%sentiment, max_length, "invoking text generator");
        generator
            .generate(&augmented, max_length)
            .map_err(PipelineError::generation)
    }
}

/// Generate text for `prompt` steered towards `sentiment` using the default
/// [`PromptComposer`].
///
/// The caller is responsible for rejecting empty prompts.
pub fn generate<G>(
    prompt: &str,
    sentiment: SentimentLabel,
    max_length: usize,
    generator: &G,
) -> Result<String>
where
    G: TextGenerator + ?Sized,
{
    PromptComposer::default().generate(prompt, sentiment, max_length, generator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingGenerator {
        calls: RefCell<Vec<(String, usize)>>,
    }

    impl TextGenerator for RecordingGenerator {
        fn generate(&self, prompt: &str, max_length: usize) -> Result<String> {
            self.calls.borrow_mut().push((prompt.to_string(), max_length));
            Ok("  generated\ntext ".to_string())
        }
    }

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        fn generate(&self, _prompt: &str, _max_length: usize) -> Result<String> {
            Err(PipelineError::Unavailable("model not loaded".into()))
        }
    }

    #[test]
    fn generator_is_called_once_with_augmented_prompt() {
        let generator = RecordingGenerator::default();
        let output = generate("The sky today", SentimentLabel::Positive, 150, &generator).unwrap();

        assert_eq!(output, "  generated\ntext ");
        let calls = generator.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (augmented, max_length) = &calls[0];
        assert!(augmented.contains("The sky today"));
        assert!(augmented.contains("positive"));
        assert_eq!(*max_length, 150);
    }

    #[test]
    fn generator_failure_is_wrapped() {
        let err = generate("hello", SentimentLabel::Neutral, 50, &FailingGenerator).unwrap_err();
        assert!(matches!(err, PipelineError::Generation(_)));
        assert!(matches!(err.root_cause(), PipelineError::Unavailable(_)));
    }

    #[test]
    fn prompt_text_is_not_interpreted_as_template() {
        let composer = PromptComposer::default();
        let augmented = composer
            .compose("{{ sentiment }} {% if x %}", SentimentLabel::Negative)
            .unwrap();
        assert!(augmented.ends_with("{{ sentiment }} {% if x %}"));
    }

    #[test]
    fn suffix_template_puts_prompt_first() {
        let composer = PromptComposer::new(PromptTemplate::suffix());
        let augmented = composer.compose("Once upon a time", SentimentLabel::Neutral).unwrap();
        assert!(augmented.starts_with("Once upon a time"));
        assert!(augmented.contains("neutral"));
    }

    #[test]
    fn custom_template_must_embed_both_variables() {
        assert!(PromptTemplate::custom("Be {{ sentiment | upper }}: {{ prompt }}").is_ok());

        let missing_prompt = PromptTemplate::custom("Write something {{ sentiment }}.");
        assert!(matches!(missing_prompt, Err(PipelineError::InvalidParams(_))));

        let missing_sentiment = PromptTemplate::custom("Continue: {{ prompt }}");
        assert!(matches!(missing_sentiment, Err(PipelineError::InvalidParams(_))));

        let literal_label = PromptTemplate::custom("Write a positive text. {{ prompt }}");
        assert!(matches!(literal_label, Err(PipelineError::InvalidParams(_))));

        let skips_neutral = PromptTemplate::custom(
            "{% if sentiment != 'neutral' %}Be {{ sentiment }}. {% endif %}{{ prompt }}",
        );
        assert!(matches!(skips_neutral, Err(PipelineError::InvalidParams(_))));
    }

    #[test]
    fn broken_template_syntax_is_invalid_params() {
        let err = PromptTemplate::custom("{{ prompt ").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParams(_)));
    }
}
