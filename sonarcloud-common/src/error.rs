use thiserror::Error;

/// Common error type for SonarCloud components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid SonarCloud URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SonarCloud returned HTTP {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using the SonarCloud [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
