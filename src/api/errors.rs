use thiserror::Error;

/// Transport-level failures of the upstream model call.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to the model endpoint failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("could not decode the model envelope: {0}")]
    Json(#[from] serde_json::Error),
    #[error("model endpoint answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model endpoint reported an error: {0}")]
    Upstream(String),
}
