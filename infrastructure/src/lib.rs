//! Infrastructure layer for thinkstep
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod local_model;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileModelConfig, FileOutputConfig,
    FilePlaygroundConfig, FileReplConfig, FileSamplingConfig, FileTranscriptConfig,
};
pub use local_model::{
    error::{LocalModelError, Result},
    gateway::{LocalModelGateway, LocalModelSettings},
    session::LocalModelSession,
};
pub use logging::JsonlTranscriptLogger;
