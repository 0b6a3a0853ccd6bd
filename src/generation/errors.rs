use crate::api::errors::ApiError;
use thiserror::Error;

/// Failures of a single generation or refinement call.
///
/// None of these touch the file collection a session already holds.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("the model returned no text")]
    EmptyResponse,
    #[error("the model response is not a valid files document: {reason}")]
    MalformedResponse { reason: String, raw: String },
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("the model returned zero files")]
    EmptyCollection,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no API key is available")]
    MissingCredential,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl GenerationError {
    fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        GenerationError::MalformedResponse {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }

    pub(crate) fn not_json(err: serde_json::Error, raw: &str) -> Self {
        Self::malformed(format!("not valid JSON ({})", err), raw)
    }

    pub(crate) fn bad_shape(reason: impl Into<String>, raw: &str) -> Self {
        Self::malformed(reason, raw)
    }

    /// Raw model text attached to the error, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            GenerationError::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// What the user can do about this failure.
    pub fn retry_hint(&self) -> &'static str {
        match self {
            GenerationError::EmptyResponse => "The model sent nothing back. Try again.",
            GenerationError::MalformedResponse { .. } => {
                "The model ignored the output format. The raw text was saved; try again."
            }
            GenerationError::InvalidState(_) => "Generate a project before refining it.",
            GenerationError::EmptyCollection => "The model produced no files. Try again.",
            GenerationError::InvalidInput(_) => "Check the arguments and try again.",
            GenerationError::MissingCredential => {
                "Set a key with `frame2code model-config --set-api-key <KEY>` or GEMINI_API_KEY."
            }
            GenerationError::Api(_) => "The request to the model failed. Try again.",
        }
    }
}
