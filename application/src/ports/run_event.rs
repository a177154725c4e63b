//! Run events emitted by the task controller for the presentation layer
//!
//! These events form the output port from the application layer to the UI.
//! `Status`, `Result` and `Error` are the status/result/error callbacks of
//! the UI collaborator; the rest carry extra context for richer front-ends.

use thinkstep_domain::{PromptMode, RunId, Stage};

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// The active mode was replaced
    ModeChanged {
        mode: PromptMode,
        label: String,
        description: String,
    },
    /// A run was accepted and is starting
    Started { run_id: RunId, mode: PromptMode },
    /// Human-readable status line
    Status(String),
    /// One model call of a stage finished
    TaskComplete {
        stage: Stage,
        index: usize,
        success: bool,
    },
    /// Final answer of a run
    Result { run_id: RunId, answer: String },
    /// A run failed; `message` is ready for display
    Error { run_id: RunId, message: String },
    /// A run was cancelled by the user
    Canceled { run_id: RunId },
}

impl RunEvent {
    /// Whether this event ends a run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunEvent::Result { .. } | RunEvent::Error { .. } | RunEvent::Canceled { .. }
        )
    }
}
