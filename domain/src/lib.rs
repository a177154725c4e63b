//! Domain layer for thinkstep
//!
//! This crate contains the core concepts of the prompting playground.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Prompting modes
//!
//! - **Zero-Shot**: the question is sent as-is, without instructions
//! - **Zero-Shot-CoT**: the question is sent with a "think step by step" nudge
//! - **Self-Consistency**: three chain-of-thought answers are produced
//!   concurrently, then the model itself compares them (merge-to-two) and
//!   rephrases the merge into one definitive answer (merge-to-one)
//!
//! ## Runs
//!
//! A run is one in-flight orchestration of a question in a mode. At most one
//! run exists at a time; see [`RunState`] for its lifecycle.

pub mod availability;
pub mod core;
pub mod orchestration;
pub mod prompt;

// Re-export commonly used types
pub use availability::{Availability, UnavailableReason};
pub use core::{
    error::DomainError,
    question::Question,
    sampling::SamplingOptions,
    string::{preview, truncate},
};
pub use orchestration::{
    entities::{CANCELED_STATUS, PromptRun, RunId, RunState, Stage},
    mode::PromptMode,
    selector::ModeSelector,
};
pub use prompt::{Instruction, PromptTemplate};
