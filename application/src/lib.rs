//! Application layer for thinkstep
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::PlaygroundConfig;
pub use ports::{
    availability::{AvailabilityPort, StaticAvailability},
    language_model::{LanguageModel, ModelError, ModelSession},
    progress::{NoProgress, ProgressNotifier},
    run_event::RunEvent,
    transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger},
};
pub use use_cases::run_prompt::{RunPromptError, RunPromptUseCase};
pub use use_cases::task_controller::{StartError, TaskController};
