//! Sampling options value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Default top-k candidate restriction
pub const DEFAULT_TOP_K: u32 = 5;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Sampling parameters passed unchanged to every model call.
///
/// Fixed for the lifetime of the process: read once from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    /// Restrict sampling to the `top_k` most likely tokens
    pub top_k: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl SamplingOptions {
    pub fn new(top_k: u32, temperature: f32) -> Result<Self, DomainError> {
        let options = Self { top_k, temperature };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.top_k == 0 {
            return Err(DomainError::InvalidSampling("top_k must be at least 1".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(DomainError::InvalidSampling(format!(
                "temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        Ok(())
    }
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}
