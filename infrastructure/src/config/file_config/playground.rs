//! Sampling and mode configuration from TOML (`[sampling]`, `[playground]`)

use serde::{Deserialize, Serialize};
use thinkstep_domain::{DomainError, PromptMode, SamplingOptions};
use thinkstep_domain::core::sampling::{DEFAULT_TEMPERATURE, DEFAULT_TOP_K};

/// Raw sampling configuration from TOML
///
/// Read once at start-up; every model call uses these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSamplingConfig {
    pub top_k: u32,
    pub temperature: f32,
}

impl Default for FileSamplingConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl FileSamplingConfig {
    pub fn to_options(&self) -> Result<SamplingOptions, DomainError> {
        SamplingOptions::new(self.top_k, self.temperature)
    }
}

/// Raw playground configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePlaygroundConfig {
    /// Mode selected at start-up; accepts the same aliases as `/mode`
    pub default_mode: String,
}

impl Default for FilePlaygroundConfig {
    fn default() -> Self {
        Self {
            default_mode: PromptMode::None.as_str().to_string(),
        }
    }
}

impl FilePlaygroundConfig {
    pub fn parse_default_mode(&self) -> Result<PromptMode, DomainError> {
        self.default_mode.parse()
    }
}
