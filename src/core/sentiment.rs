use std::str::FromStr;

use super::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// One of the three sentiment categories a prompt can be steered towards.
pub enum SentimentLabel {
    /// Affectively positive text.
    Positive,
    /// Affectively negative text.
    Negative,
    /// Neither clearly positive nor clearly negative.
    Neutral,
}

impl SentimentLabel {
    /// Every label, in display order.
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    /// Returns the lowercase string representation of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        SentimentLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == normalized)
            .ok_or_else(|| {
                PipelineError::InvalidInput(format!(
                    "Unknown sentiment '{s}'. Expected one of: positive, negative, neutral"
                ))
            })
    }
}

/// How the sentiment for a request is chosen: detected from the prompt, or
/// fixed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentimentChoice {
    /// Detect the sentiment from the prompt text.
    #[default]
    Auto,
    /// Use this sentiment regardless of what the prompt says.
    Manual(SentimentLabel),
}

impl SentimentChoice {
    /// The caller-supplied label, if any.
    pub fn manual(&self) -> Option<SentimentLabel> {
        match self {
            SentimentChoice::Auto => None,
            SentimentChoice::Manual(label) => Some(*label),
        }
    }
}

impl From<SentimentLabel> for SentimentChoice {
    fn from(label: SentimentLabel) -> Self {
        SentimentChoice::Manual(label)
    }
}

impl std::fmt::Display for SentimentChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentChoice::Auto => write!(f, "Auto"),
            SentimentChoice::Manual(label) => write!(f, "{label}"),
        }
    }
}

impl FromStr for SentimentChoice {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(SentimentChoice::Auto);
        }
        s.parse::<SentimentLabel>().map(SentimentChoice::Manual)
    }
}
