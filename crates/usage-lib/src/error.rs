//! Error types for collaborator calls

/// Errors raised while talking to the monitoring and billing APIs
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid project ref: {0:?}")]
    InvalidProjectRef(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, UsageError>;
