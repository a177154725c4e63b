//! Model service configuration from TOML (`[model]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:11434";
pub const DEFAULT_MODEL_NAME: &str = "llama3.2";

/// Raw model service configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Base URL of the local model server
    pub endpoint: String,
    /// Model identifier on that server
    pub name: String,
    /// When false the model is reported as turned off
    pub enabled: bool,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// How long prewarmed weights stay resident (server duration syntax, e.g. "5m")
    pub keep_alive: String,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            name: DEFAULT_MODEL_NAME.to_string(),
            enabled: true,
            timeout_seconds: 120,
            keep_alive: "5m".to_string(),
        }
    }
}

impl FileModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
