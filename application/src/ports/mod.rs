//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod availability;
pub mod language_model;
pub mod progress;
pub mod run_event;
pub mod transcript_logger;
