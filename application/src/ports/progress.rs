//! Progress notification port
//!
//! Defines the interface for reporting progress while a prompt run executes.

use thinkstep_domain::Stage;

/// Callback for progress updates during a prompt run
///
/// Stages are reported in strict order. Task completions within
/// [`Stage::InitialAnswers`] arrive in completion order, tagged with their
/// positional index.
pub trait ProgressNotifier: Send + Sync {
    /// Called before a stage issues its model calls
    fn on_stage_start(&self, stage: &Stage);

    /// Called when one model call of a stage finishes
    fn on_task_complete(&self, _stage: &Stage, _index: usize, _success: bool) {}

    /// Called when every call of a stage has finished
    fn on_stage_complete(&self, _stage: &Stage) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: &Stage) {}
}
