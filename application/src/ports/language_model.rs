//! Language model port
//!
//! Defines the interface for calling the external language-model service.

use async_trait::async_trait;
use thinkstep_domain::{Instruction, SamplingOptions};
use thiserror::Error;

/// Errors that can occur while calling the model service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway to the language-model service
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Create a session that answers under the given instruction
    async fn create_session(
        &self,
        instruction: &Instruction,
        options: &SamplingOptions,
    ) -> Result<Box<dyn ModelSession>, ModelError>;

    /// One complete model call: session, warm-up, single exchange.
    async fn generate(
        &self,
        instruction: &Instruction,
        input: &str,
        options: &SamplingOptions,
    ) -> Result<String, ModelError> {
        let session = self.create_session(instruction, options).await?;
        session.prewarm().await;
        session.respond(input).await
    }
}

/// A session bound to one instruction
#[async_trait]
pub trait ModelSession: Send + Sync {
    /// Instruction this session was created with
    fn instruction(&self) -> &Instruction;

    /// Lightweight initialization that may reduce first-call latency.
    ///
    /// Must not change the output of [`respond`](Self::respond).
    async fn prewarm(&self) {}

    /// Send the prompt and return the generated text
    async fn respond(&self, prompt: &str) -> Result<String, ModelError>;
}
