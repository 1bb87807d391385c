use thiserror::Error;

/// Error type shared by every pipeline, collaborator and session in this crate.
#[derive(Debug, Error)]
pub enum PipelineError {
    // Caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid generation parameters: {0}")]
    InvalidParams(String),

    // Collaborators
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Sentiment analysis failed: {0}")]
    Analysis(#[source] Box<PipelineError>),

    #[error("Generation failed: {0}")]
    Generation(#[source] Box<PipelineError>),

    // Model loading
    #[error("Invalid model format: {0}")]
    ModelFormat(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Device error: {0}")]
    Device(String),

    // Pass-through from dependencies
    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Wrap a collaborator failure raised while scoring polarity.
    pub fn analysis(cause: PipelineError) -> Self {
        PipelineError::Analysis(Box::new(cause))
    }

    /// Wrap a collaborator failure raised while generating text.
    pub fn generation(cause: PipelineError) -> Self {
        PipelineError::Generation(Box::new(cause))
    }

    /// The innermost error, looking through `Analysis` and `Generation` wrappers.
    pub fn root_cause(&self) -> &PipelineError {
        match self {
            PipelineError::Analysis(inner) | PipelineError::Generation(inner) => {
                inner.root_cause()
            }
            other => other,
        }
    }
}

impl From<hf_hub::api::sync::ApiError> for PipelineError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        PipelineError::Download(value.to_string())
    }
}
