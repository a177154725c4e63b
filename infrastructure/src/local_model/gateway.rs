//! Local model server gateway implementation

use super::error::{LocalModelError, Result};
use super::protocol::{ErrorResponse, MIN_SERVER_VERSION, TagsResponse, VersionResponse, parse_version};
use super::session::LocalModelSession;
use crate::config::FileModelConfig;
use async_trait::async_trait;
use std::sync::Arc;
use thinkstep_application::{AvailabilityPort, LanguageModel, ModelError, ModelSession};
use thinkstep_domain::{Availability, Instruction, SamplingOptions, UnavailableReason};
use tracing::{debug, info, warn};

/// Connection settings shared by the gateway and its sessions
#[derive(Debug, Clone, PartialEq)]
pub struct LocalModelSettings {
    pub endpoint: String,
    pub model: String,
    pub enabled: bool,
    pub keep_alive: String,
}

impl LocalModelSettings {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }
}

impl From<&FileModelConfig> for LocalModelSettings {
    fn from(config: &FileModelConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            model: config.name.clone(),
            enabled: config.enabled,
            keep_alive: config.keep_alive.clone(),
        }
    }
}

/// Turn a non-2xx response into [`LocalModelError::Status`].
///
/// The server reports failures as `{"error": "..."}`; other bodies are
/// passed through as-is.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    Err(LocalModelError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Language model gateway for a locally hosted model server
pub struct LocalModelGateway {
    client: reqwest::Client,
    settings: Arc<LocalModelSettings>,
}

impl LocalModelGateway {
    /// Create a gateway from the `[model]` config section
    pub fn new(config: &FileModelConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        info!(
            endpoint = %config.endpoint,
            model = %config.name,
            "LocalModelGateway initialized"
        );

        Ok(Self::with_client(client, LocalModelSettings::from(config)))
    }

    /// Create a gateway with an existing HTTP client
    pub fn with_client(client: reqwest::Client, settings: LocalModelSettings) -> Self {
        Self {
            client,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &LocalModelSettings {
        &self.settings
    }

    /// Query the server version
    pub async fn server_version(&self) -> Result<String> {
        let response = self
            .client
            .get(self.settings.url("/api/version"))
            .send()
            .await?;
        let body: VersionResponse = check_status(response).await?.json().await?;
        Ok(body.version)
    }

    /// List the models installed on the server
    pub async fn installed_models(&self) -> Result<TagsResponse> {
        let response = self
            .client
            .get(self.settings.url("/api/tags"))
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Probe the server, mapping each failure to the reason shown to the user
    async fn probe(&self) -> Availability {
        if !self.settings.enabled {
            return Availability::Unavailable(UnavailableReason::FeatureDisabled);
        }

        let version = match self.server_version().await {
            Ok(v) => v,
            Err(e) => {
                warn!("Model server unreachable: {}", e);
                return Availability::Unavailable(UnavailableReason::Unknown);
            }
        };
        match parse_version(&version) {
            Some(v) if v >= MIN_SERVER_VERSION => {}
            _ => {
                warn!("{}", LocalModelError::UnsupportedVersion(version));
                return Availability::Unavailable(UnavailableReason::DeviceNotEligible);
            }
        }

        match self.installed_models().await {
            Ok(tags) if tags.contains(&self.settings.model) => Availability::Available,
            Ok(_) => {
                info!(model = %self.settings.model, "Model is not installed yet");
                Availability::Unavailable(UnavailableReason::ModelNotReady)
            }
            Err(e) => {
                warn!("Could not list installed models: {}", e);
                Availability::Unavailable(UnavailableReason::Unknown)
            }
        }
    }
}

#[async_trait]
impl LanguageModel for LocalModelGateway {
    async fn create_session(
        &self,
        instruction: &Instruction,
        options: &SamplingOptions,
    ) -> std::result::Result<Box<dyn ModelSession>, ModelError> {
        Ok(Box::new(LocalModelSession::new(
            self.client.clone(),
            Arc::clone(&self.settings),
            instruction.clone(),
            *options,
        )))
    }
}

#[async_trait]
impl AvailabilityPort for LocalModelGateway {
    async fn availability(&self) -> Availability {
        let availability = self.probe().await;
        debug!(?availability, "Availability probed");
        availability
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_model::test_server::{Route, StubServer};
    use thinkstep_domain::PromptTemplate;

    fn gateway(server: &StubServer, enabled: bool) -> LocalModelGateway {
        LocalModelGateway::with_client(
            reqwest::Client::new(),
            LocalModelSettings {
                endpoint: server.base_url(),
                model: "llama3.2".to_string(),
                enabled,
                keep_alive: "5m".to_string(),
            },
        )
    }

    fn healthy_routes() -> Vec<Route> {
        vec![
            Route::ok("/api/version", r#"{"version":"0.5.7"}"#),
            Route::ok("/api/tags", r#"{"models":[{"name":"llama3.2:latest"}]}"#),
        ]
    }

    #[tokio::test]
    async fn test_available_when_server_and_model_ready() {
        let server = StubServer::start(healthy_routes()).await;
        assert_eq!(
            gateway(&server, true).availability().await,
            Availability::Available
        );
    }

    #[tokio::test]
    async fn test_disabled_never_contacts_server() {
        let server = StubServer::start(healthy_routes()).await;
        assert_eq!(
            gateway(&server, false).availability().await,
            Availability::Unavailable(UnavailableReason::FeatureDisabled)
        );
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_old_server_is_not_eligible() {
        let server = StubServer::start(vec![Route::ok(
            "/api/version",
            r#"{"version":"0.1.9"}"#,
        )])
        .await;
        assert_eq!(
            gateway(&server, true).availability().await,
            Availability::Unavailable(UnavailableReason::DeviceNotEligible)
        );
    }

    #[tokio::test]
    async fn test_missing_model_is_not_ready() {
        let server = StubServer::start(vec![
            Route::ok("/api/version", r#"{"version":"0.5.7"}"#),
            Route::ok("/api/tags", r#"{"models":[{"name":"phi3:latest"}]}"#),
        ])
        .await;
        assert_eq!(
            gateway(&server, true).availability().await,
            Availability::Unavailable(UnavailableReason::ModelNotReady)
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unknown() {
        let gateway = LocalModelGateway::with_client(
            reqwest::Client::new(),
            LocalModelSettings {
                endpoint: "http://127.0.0.1:1".to_string(),
                model: "llama3.2".to_string(),
                enabled: true,
                keep_alive: "5m".to_string(),
            },
        );
        assert_eq!(
            gateway.availability().await,
            Availability::Unavailable(UnavailableReason::Unknown)
        );
    }

    #[tokio::test]
    async fn test_generate_prewarms_then_chats() {
        let server = StubServer::start(vec![
            Route::ok("/api/generate", r#"{"done":true}"#),
            Route::ok(
                "/api/chat",
                r#"{"message":{"role":"assistant","content":"Yes."},"done":true}"#,
            ),
        ])
        .await;
        let gateway = gateway(&server, true);
        let instruction = Instruction::new(PromptTemplate::CHAIN_OF_THOUGHT);

        let answer = gateway
            .generate(&instruction, "Is the sky blue?", &SamplingOptions::default())
            .await
            .unwrap();

        assert_eq!(answer, "Yes.");
        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].path, "/api/generate");
        assert_eq!(requests[0].body["prompt"], "");
        assert_eq!(requests[0].body["keep_alive"], "5m");
        assert_eq!(requests[1].path, "/api/chat");
        assert_eq!(requests[1].body["stream"], false);
        assert_eq!(
            requests[1].body["messages"][0]["content"],
            "Let's think step by step."
        );
        assert_eq!(requests[1].body["messages"][1]["content"], "Is the sky blue?");
        assert_eq!(requests[1].body["options"]["top_k"], 5);
    }

    #[tokio::test]
    async fn test_failed_prewarm_does_not_affect_answer() {
        let server = StubServer::start(vec![
            Route::status("/api/generate", 500, r#"{"error":"busy"}"#),
            Route::ok(
                "/api/chat",
                r#"{"message":{"role":"assistant","content":"4"},"done":true}"#,
            ),
        ])
        .await;

        let answer = gateway(&server, true)
            .generate(&Instruction::empty(), "What is 2+2?", &SamplingOptions::default())
            .await
            .unwrap();

        assert_eq!(answer, "4");
    }

    #[tokio::test]
    async fn test_chat_error_status_maps_to_model_error() {
        let server = StubServer::start(vec![
            Route::ok("/api/generate", r#"{"done":true}"#),
            Route::status("/api/chat", 404, r#"{"error":"model 'llama3.2' not found"}"#),
        ])
        .await;

        let err = gateway(&server, true)
            .generate(&Instruction::empty(), "q", &SamplingOptions::default())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ModelError::ModelNotAvailable("model 'llama3.2' not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_chat_without_message_is_invalid_response() {
        let server = StubServer::start(vec![
            Route::ok("/api/generate", r#"{"done":true}"#),
            Route::ok("/api/chat", r#"{"done":true}"#),
        ])
        .await;

        let err = gateway(&server, true)
            .generate(&Instruction::empty(), "q", &SamplingOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }

    #[test]
    fn test_settings_url_joins_trailing_slash() {
        let settings = LocalModelSettings {
            endpoint: "http://localhost:11434/".to_string(),
            model: "m".to_string(),
            enabled: true,
            keep_alive: "5m".to_string(),
        };
        assert_eq!(settings.url("/api/chat"), "http://localhost:11434/api/chat");
    }
}
