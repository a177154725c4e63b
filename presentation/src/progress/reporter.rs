//! Progress reporting for prompt runs

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use thinkstep_application::RunEvent;
use thinkstep_domain::{CANCELED_STATUS, Stage};

/// Renders the progress part of the run event stream.
///
/// Final answers and errors are printed by the caller; reporters only
/// show what happens in between.
pub trait RunReporter: Send + Sync {
    fn on_event(&self, event: &RunEvent);
}

/// Spinner showing the current stage status
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
    completed: Mutex<usize>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            completed: Mutex::new(0),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start(&self, prefix: String) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(prefix);
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Some(old) = self.spinner.lock().unwrap_or_else(|e| e.into_inner()).replace(pb) {
            old.finish_and_clear();
        }
    }

    fn with_spinner(&self, f: impl FnOnce(&ProgressBar)) {
        if let Some(pb) = self.spinner.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            f(pb);
        }
    }

    fn clear(&self) {
        if let Some(pb) = self.spinner.lock().unwrap_or_else(|e| e.into_inner()).take() {
            pb.finish_and_clear();
        }
    }

    fn task_message(stage: &Stage, index: usize, success: bool, completed: usize) -> String {
        let mark = if success { "v".green() } else { "x".red() };
        if stage.total_tasks() > 1 {
            format!(
                "{} answer {} ({}/{})",
                mark,
                index + 1,
                completed,
                stage.total_tasks()
            )
        } else {
            format!("{} {}", mark, stage)
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReporter for ProgressReporter {
    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::Started { run_id, mode } => {
                self.start(format!("{} [{}]", mode.label(), run_id));
            }
            RunEvent::Status(status) => {
                *self.completed.lock().unwrap_or_else(|e| e.into_inner()) = 0;
                self.with_spinner(|pb| pb.set_message(status.clone()));
            }
            RunEvent::TaskComplete {
                stage,
                index,
                success,
            } => {
                let completed = {
                    let mut count = self.completed.lock().unwrap_or_else(|e| e.into_inner());
                    *count += 1;
                    *count
                };
                let message = Self::task_message(stage, *index, *success, completed);
                self.with_spinner(|pb| pb.println(format!("  {}", message)));
            }
            RunEvent::Result { .. } | RunEvent::Error { .. } | RunEvent::Canceled { .. } => {
                self.clear();
            }
            RunEvent::ModeChanged { .. } => {}
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl RunReporter for SimpleProgress {
    fn on_event(&self, event: &RunEvent) {
        match event {
            // The caller announces cancellation itself
            RunEvent::Status(status) if status != CANCELED_STATUS => {
                println!("{}", ConsoleFormatter::format_status(status))
            }
            RunEvent::TaskComplete {
                stage,
                index,
                success: false,
            } => println!("  {} {} #{} (failed)", "x".red(), stage, index + 1),
            _ => {}
        }
    }
}

/// Reporter that shows nothing (`--quiet`)
pub struct NoReporter;

impl RunReporter for NoReporter {
    fn on_event(&self, _event: &RunEvent) {}
}
