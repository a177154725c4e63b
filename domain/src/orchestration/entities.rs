//! Orchestration domain entities

use crate::core::question::Question;
use crate::orchestration::mode::PromptMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status emitted when a run is cancelled by the user
pub const CANCELED_STATUS: &str = "Canceled.";

/// Stage of a prompt run
///
/// Stages are emitted in strict order; the self-consistency path runs
/// `InitialAnswers` → `Evaluation` → `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Single zero-shot call
    ZeroShot,
    /// Single chain-of-thought call
    ZeroShotCoT,
    /// Three concurrent chain-of-thought calls
    InitialAnswers,
    /// Compare the three answers and merge the two most similar
    Evaluation,
    /// Rephrase the merged answer into one definitive answer
    Result,
}

impl Stage {
    /// Stages a run in the given mode passes through, in order
    pub fn stages_for(mode: PromptMode) -> Vec<Stage> {
        match mode {
            PromptMode::None => vec![],
            PromptMode::ZeroShot => vec![Stage::ZeroShot],
            PromptMode::ZeroShotCoT => vec![Stage::ZeroShotCoT],
            PromptMode::SelfConsistency => {
                vec![Stage::InitialAnswers, Stage::Evaluation, Stage::Result]
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ZeroShot => "zero_shot",
            Stage::ZeroShotCoT => "zero_shot_cot",
            Stage::InitialAnswers => "initial_answers",
            Stage::Evaluation => "evaluation",
            Stage::Result => "result",
        }
    }

    /// Progress string shown to the user before the stage starts
    pub fn status_text(&self) -> &'static str {
        match self {
            Stage::ZeroShot => "Loading Zero-Shot...",
            Stage::ZeroShotCoT => "Loading Zero-Shot-CoT...",
            Stage::InitialAnswers => "Loading initial answers...",
            Stage::Evaluation => "Loading evaluation...",
            Stage::Result => "Loading result...",
        }
    }

    /// Number of model calls issued within this stage
    pub fn total_tasks(&self) -> usize {
        match self {
            Stage::InitialAnswers => 3,
            _ => 1,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier of a run, monotonically increasing per controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Lifecycle state of the task controller
///
/// `Idle → Running → {Completed, Cancelled, Failed} → Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunState {
    /// Whether a new run may start from this state
    pub fn is_idle(&self) -> bool {
        matches!(self, RunState::Idle)
    }

    /// Whether this is one of the terminal states of a run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Cancelled | RunState::Failed
        )
    }

    /// Whether `self → next` is a legal transition
    pub fn can_transition_to(&self, next: RunState) -> bool {
        match (self, next) {
            (RunState::Idle, RunState::Running) => true,
            (RunState::Running, n) => n.is_terminal(),
            (s, RunState::Idle) => s.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Cancelled => "cancelled",
            RunState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// One in-flight orchestration (Entity)
#[derive(Debug, Clone)]
pub struct PromptRun {
    id: RunId,
    mode: PromptMode,
    question: Question,
    current_stage: Option<Stage>,
}

impl PromptRun {
    pub fn new(id: RunId, mode: PromptMode, question: Question) -> Self {
        Self {
            id,
            mode,
            question,
            current_stage: None,
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn current_stage(&self) -> Option<Stage> {
        self.current_stage
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.current_stage = Some(stage);
    }

    /// Stages this run will execute
    pub fn stages(&self) -> Vec<Stage> {
        Stage::stages_for(self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_for_modes() {
        assert!(Stage::stages_for(PromptMode::None).is_empty());
        assert_eq!(Stage::stages_for(PromptMode::ZeroShot), vec![Stage::ZeroShot]);
        assert_eq!(
            Stage::stages_for(PromptMode::SelfConsistency),
            vec![Stage::InitialAnswers, Stage::Evaluation, Stage::Result]
        );
    }

    #[test]
    fn test_stage_task_counts_match_mode_call_counts() {
        for mode in PromptMode::selectable() {
            let total: usize = Stage::stages_for(mode).iter().map(|s| s.total_tasks()).sum();
            assert_eq!(total, mode.call_count());
        }
    }

    #[test]
    fn test_status_texts() {
        assert_eq!(Stage::InitialAnswers.status_text(), "Loading initial answers...");
        assert_eq!(Stage::Evaluation.status_text(), "Loading evaluation...");
        assert_eq!(Stage::Result.status_text(), "Loading result...");
    }

    #[test]
    fn test_run_state_transitions() {
        assert!(RunState::Idle.can_transition_to(RunState::Running));
        assert!(RunState::Running.can_transition_to(RunState::Completed));
        assert!(RunState::Running.can_transition_to(RunState::Cancelled));
        assert!(RunState::Running.can_transition_to(RunState::Failed));
        assert!(RunState::Failed.can_transition_to(RunState::Idle));
        assert!(!RunState::Idle.can_transition_to(RunState::Completed));
        assert!(!RunState::Running.can_transition_to(RunState::Running));
        assert!(!RunState::Completed.can_transition_to(RunState::Running));
    }

    #[test]
    fn test_prompt_run_tracks_stage() {
        let question = Question::try_new("Is the sky blue?").unwrap();
        let mut run = PromptRun::new(RunId(7), PromptMode::SelfConsistency, question);
        assert_eq!(run.current_stage(), None);
        run.set_stage(Stage::Evaluation);
        assert_eq!(run.current_stage(), Some(Stage::Evaluation));
        assert_eq!(run.id().to_string(), "run-7");
        assert_eq!(run.stages().len(), 3);
    }
}
