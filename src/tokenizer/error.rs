//! Error types for the tokenizer module

use thiserror::Error;

/// Result type for tokenizer operations
pub type TokenizerResult<T> = Result<T, TokenizerError>;

/// Errors that can occur while setting up or calling a counting backend
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Error status returned by the remote API
    #[error("API error: {0}")]
    ApiError(String),

    /// Remote API rejected the credentials
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Error from the local encoding library
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// No encoding or remote model matches the identifier
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    /// Required API key not configured
    #[error("Environment variable not set: {0}")]
    EnvVarError(String),

    /// Transport-level failure
    #[error("Request error: {0}")]
    RequestError(String),
}

impl From<reqwest::Error> for TokenizerError {
    fn from(error: reqwest::Error) -> Self {
        TokenizerError::RequestError(error.to_string())
    }
}
