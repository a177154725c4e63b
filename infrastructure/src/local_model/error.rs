//! Error types for the local model server adapter

use thinkstep_application::ModelError;
use thiserror::Error;

/// Result type alias for local model server operations
pub type Result<T> = std::result::Result<T, LocalModelError>;

/// Errors that can occur when talking to the local model server
#[derive(Error, Debug)]
pub enum LocalModelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Unsupported server version: {0}")]
    UnsupportedVersion(String),
}

impl From<LocalModelError> for ModelError {
    fn from(error: LocalModelError) -> Self {
        match error {
            LocalModelError::Http(e) if e.is_timeout() => ModelError::Timeout,
            LocalModelError::Http(e) if e.is_connect() => ModelError::ConnectionError(e.to_string()),
            LocalModelError::Http(e) if e.is_decode() => ModelError::InvalidResponse(e.to_string()),
            LocalModelError::Http(e) => ModelError::RequestFailed(e.to_string()),
            LocalModelError::Status {
                status: 404,
                message,
            } => ModelError::ModelNotAvailable(message),
            e @ LocalModelError::Status { .. } => ModelError::RequestFailed(e.to_string()),
            LocalModelError::Malformed(message) => ModelError::InvalidResponse(message),
            e @ LocalModelError::UnsupportedVersion(_) => ModelError::Other(e.to_string()),
        }
    }
}
