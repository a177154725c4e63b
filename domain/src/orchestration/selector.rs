//! Mode selector (pure state, no I/O)

use crate::orchestration::mode::PromptMode;

/// Holds the active [`PromptMode`].
///
/// Any selection replaces the previous mode outright. Selecting while a run
/// is active only affects the next submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeSelector {
    current: PromptMode,
}

impl ModeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a mode already selected
    pub fn with_mode(mode: PromptMode) -> Self {
        Self { current: mode }
    }

    /// Replace the active mode, returning the previous one
    pub fn select(&mut self, mode: PromptMode) -> PromptMode {
        std::mem::replace(&mut self.current, mode)
    }

    pub fn current(&self) -> PromptMode {
        self.current
    }

    pub fn label(&self) -> &'static str {
        self.current.label()
    }

    pub fn description(&self) -> &'static str {
        self.current.description()
    }

    /// Whether the active mode permits submitting a question
    pub fn can_submit(&self) -> bool {
        self.current.allows_submission()
    }
}
