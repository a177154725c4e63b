//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types after
//! validation.

mod model;
mod output;
mod playground;
mod repl;

pub use model::{DEFAULT_ENDPOINT, DEFAULT_MODEL_NAME, FileModelConfig};
pub use output::{FileOutputConfig, FileTranscriptConfig};
pub use playground::{FilePlaygroundConfig, FileSamplingConfig};
pub use repl::FileReplConfig;

use serde::{Deserialize, Serialize};
use thinkstep_application::PlaygroundConfig;
use thinkstep_domain::DomainError;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("sampling.top_k must be at least 1")]
    InvalidTopK,

    #[error("sampling.temperature must be within 0.0..=2.0, got {0}")]
    InvalidTemperature(f32),

    #[error("model.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("model.name cannot be empty")]
    EmptyModelName,

    #[error("model.endpoint cannot be empty")]
    EmptyEndpoint,

    #[error("playground.default_mode: {0}")]
    InvalidMode(DomainError),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Local model server settings
    pub model: FileModelConfig,
    /// Sampling parameters passed to every model call
    pub sampling: FileSamplingConfig,
    /// Start-up mode selection
    pub playground: FilePlaygroundConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Run transcript settings
    pub transcript: FileTranscriptConfig,
}

impl FileConfig {
    /// Validate the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.sampling.top_k == 0 {
            return Err(ConfigValidationError::InvalidTopK);
        }
        let temperature = self.sampling.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigValidationError::InvalidTemperature(temperature));
        }
        if self.model.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.model.name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if self.model.endpoint.trim().is_empty() {
            return Err(ConfigValidationError::EmptyEndpoint);
        }
        self.playground
            .parse_default_mode()
            .map_err(ConfigValidationError::InvalidMode)?;
        Ok(())
    }

    /// Validate and convert into the settings the use cases consume.
    pub fn to_playground_config(&self) -> Result<PlaygroundConfig, ConfigValidationError> {
        self.validate()?;
        let sampling = self
            .sampling
            .to_options()
            .map_err(|_| ConfigValidationError::InvalidTopK)?;
        let mode = self
            .playground
            .parse_default_mode()
            .map_err(ConfigValidationError::InvalidMode)?;
        Ok(PlaygroundConfig::new(sampling).with_initial_mode(mode))
    }
}
