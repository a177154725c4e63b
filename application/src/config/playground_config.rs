//! Configuration consumed by the use cases

use thinkstep_domain::{PromptMode, SamplingOptions};

/// Settings fixed for the lifetime of a controller
///
/// Built by the infrastructure layer from the config file; the sampling
/// options are passed unchanged to every model call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaygroundConfig {
    sampling: SamplingOptions,
    initial_mode: PromptMode,
}

impl PlaygroundConfig {
    pub fn new(sampling: SamplingOptions) -> Self {
        Self {
            sampling,
            initial_mode: PromptMode::None,
        }
    }

    pub fn with_initial_mode(mut self, mode: PromptMode) -> Self {
        self.initial_mode = mode;
        self
    }

    pub fn sampling(&self) -> &SamplingOptions {
        &self.sampling
    }

    pub fn initial_mode(&self) -> PromptMode {
        self.initial_mode
    }
}
