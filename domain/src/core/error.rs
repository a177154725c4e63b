//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    #[error("Invalid sampling options: {0}")]
    InvalidSampling(String),
}
