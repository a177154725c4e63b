//! Local model server session.
//!
//! Provides [`LocalModelSession`] which implements [`ModelSession`]: one
//! instruction and one set of sampling options bound to the server's
//! stateless chat endpoint.

use super::error::{LocalModelError, Result};
use super::gateway::{LocalModelSettings, check_status};
use super::protocol::{ChatRequest, ChatResponse, GenerateRequest};
use async_trait::async_trait;
use std::sync::Arc;
use thinkstep_application::{ModelError, ModelSession};
use thinkstep_domain::{Instruction, SamplingOptions, preview};
use tracing::debug;

/// A session answering under a fixed instruction.
///
/// Creating one does not contact the server; every [`respond`] is a
/// single independent chat request carrying the instruction.
///
/// [`respond`]: ModelSession::respond
pub struct LocalModelSession {
    client: reqwest::Client,
    settings: Arc<LocalModelSettings>,
    instruction: Instruction,
    options: SamplingOptions,
}

impl LocalModelSession {
    pub fn new(
        client: reqwest::Client,
        settings: Arc<LocalModelSettings>,
        instruction: Instruction,
        options: SamplingOptions,
    ) -> Self {
        Self {
            client,
            settings,
            instruction,
            options,
        }
    }

    /// Ask the server to load the model weights without generating.
    pub async fn load(&self) -> Result<()> {
        let request = GenerateRequest {
            model: &self.settings.model,
            prompt: "",
            keep_alive: &self.settings.keep_alive,
            stream: false,
        };
        let response = self
            .client
            .post(self.settings.url("/api/generate"))
            .json(&request)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Send one chat request and return the generated text.
    pub async fn chat(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(
            &self.settings.model,
            self.instruction.as_str(),
            prompt,
            &self.options,
            &self.settings.keep_alive,
        );

        debug!(
            model = %self.settings.model,
            prompt = %preview(prompt, 80),
            "Sending chat request"
        );

        let response = self
            .client
            .post(self.settings.url("/api/chat"))
            .json(&request)
            .send()
            .await?;
        let body: ChatResponse = check_status(response).await?.json().await?;

        body.message
            .map(|m| m.content)
            .ok_or_else(|| LocalModelError::Malformed("response has no message".to_string()))
    }
}

#[async_trait]
impl ModelSession for LocalModelSession {
    fn instruction(&self) -> &Instruction {
        &self.instruction
    }

    async fn prewarm(&self) {
        if let Err(e) = self.load().await {
            debug!("Prewarm failed, continuing: {}", e);
        }
    }

    async fn respond(&self, prompt: &str) -> std::result::Result<String, ModelError> {
        Ok(self.chat(prompt).await?)
    }
}
