//! JSON wire types for the local model server HTTP API.
//!
//! # Endpoints used
//!
//! - `POST /api/generate` with an empty prompt: load weights (warm-up)
//! - `POST /api/chat`: single non-streaming chat completion
//! - `GET /api/version`: server version
//! - `GET /api/tags`: installed models

use serde::{Deserialize, Serialize};
use thinkstep_domain::SamplingOptions;

/// Oldest server version whose chat API this client speaks
pub const MIN_SERVER_VERSION: (u64, u64, u64) = (0, 1, 14);

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Creates a system message (instructions for the model).
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Creates a user message (the prompt).
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling options understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Options {
    pub top_k: u32,
    pub temperature: f32,
}

impl From<&SamplingOptions> for Options {
    fn from(options: &SamplingOptions) -> Self {
        Self {
            top_k: options.top_k,
            temperature: options.temperature,
        }
    }
}

/// Warm-up request: an empty prompt loads the model without generating
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub keep_alive: &'a str,
    pub stream: bool,
}

/// Chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub options: Options,
    pub keep_alive: &'a str,
}

impl<'a> ChatRequest<'a> {
    /// Build a request; an empty instruction sends no system message.
    pub fn new(
        model: &'a str,
        instruction: &str,
        prompt: &str,
        options: &SamplingOptions,
        keep_alive: &'a str,
    ) -> Self {
        let mut messages = Vec::with_capacity(2);
        if !instruction.is_empty() {
            messages.push(Message::system(instruction));
        }
        messages.push(Message::user(prompt));
        Self {
            model,
            messages,
            stream: false,
            options: options.into(),
            keep_alive,
        }
    }
}

/// Chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: Option<Message>,
    #[serde(default)]
    pub done: bool,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `GET /api/version` response
#[derive(Debug, Clone, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

/// `GET /api/tags` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// One installed model
#[derive(Debug, Clone, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

impl TagsResponse {
    /// Whether the named model is installed.
    ///
    /// A name without a tag matches the `latest` tag.
    pub fn contains(&self, name: &str) -> bool {
        self.models.iter().any(|tag| {
            tag.name == name
                || (!name.contains(':')
                    && tag.name.strip_suffix(":latest") == Some(name))
        })
    }
}

/// Parse a `major.minor.patch` version, ignoring any pre-release suffix.
pub fn parse_version(version: &str) -> Option<(u64, u64, u64)> {
    let core = version
        .trim()
        .trim_start_matches('v')
        .split(['-', '+'])
        .next()?;
    let mut parts = core.split('.').map(|p| p.parse::<u64>());
    let major = parts.next()?.ok()?;
    let minor = parts.next().unwrap_or(Ok(0)).ok()?;
    let patch = parts.next().unwrap_or(Ok(0)).ok()?;
    Some((major, minor, patch))
}
