//! Task Controller
//!
//! Owns the lifecycle of the single in-flight prompt run: start, cooperative
//! cancellation and completion. Emits [`RunEvent`] messages to a channel for
//! the presentation layer to render.

use crate::config::PlaygroundConfig;
use crate::ports::availability::AvailabilityPort;
use crate::ports::language_model::LanguageModel;
use crate::ports::progress::ProgressNotifier;
use crate::ports::run_event::RunEvent;
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};
use crate::use_cases::run_prompt::{RunPromptError, RunPromptUseCase};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thinkstep_domain::{
    CANCELED_STATUS, ModeSelector, PromptMode, PromptRun, Question, RunId, RunState, Stage,
    UnavailableReason,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Reasons a run is rejected before it starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("No mode selected")]
    NoModeSelected,

    #[error("A run is already in progress")]
    AlreadyRunning,

    #[error("Question is empty")]
    EmptyInput,

    #[error("Model unavailable: {0:?}")]
    ModelUnavailable(UnavailableReason),
}

impl StartError {
    /// Status line shown to the user for this rejection
    pub fn status_message(&self) -> &'static str {
        match self {
            StartError::NoModeSelected => "Please select a mode.",
            StartError::AlreadyRunning => "A question is already being answered.",
            StartError::EmptyInput => "Please enter a question.",
            StartError::ModelUnavailable(reason) => reason.message(),
        }
    }
}

/// The run currently owned by the controller
struct ActiveRun {
    id: RunId,
    cancellation: CancellationToken,
}

/// Mutable controller state, shared with the spawned run task
#[derive(Default)]
struct ControllerState {
    state: RunState,
    active: Option<ActiveRun>,
    last_outcome: Option<RunState>,
}

type SharedState = Arc<Mutex<ControllerState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, ControllerState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Forwards stage progress of one run to the event channel.
///
/// Emits under the controller lock and only while the run is still active
/// and not cancelled, so no stage status can follow "Canceled.".
struct RunProgress {
    run_id: RunId,
    shared: SharedState,
    tx: mpsc::UnboundedSender<RunEvent>,
}

impl RunProgress {
    fn emit(&self, event: RunEvent) {
        let guard = lock(&self.shared);
        let live = matches!(
            &guard.active,
            Some(active) if active.id == self.run_id && !active.cancellation.is_cancelled()
        );
        if live {
            let _ = self.tx.send(event);
        }
    }
}

impl ProgressNotifier for RunProgress {
    fn on_stage_start(&self, stage: &Stage) {
        self.emit(RunEvent::Status(stage.status_text().to_string()));
    }

    fn on_task_complete(&self, stage: &Stage, index: usize, success: bool) {
        self.emit(RunEvent::TaskComplete {
            stage: *stage,
            index,
            success,
        });
    }
}

/// Controller managing the one-run-at-a-time lifecycle
///
/// State machine: `Idle → Running → {Completed, Cancelled, Failed} → Idle`.
/// A second start while a run exists is rejected, never queued.
pub struct TaskController<G: LanguageModel + 'static, A: AvailabilityPort + 'static> {
    use_case: Arc<RunPromptUseCase<G>>,
    availability: Arc<A>,
    selector: Mutex<ModeSelector>,
    shared: SharedState,
    task: Mutex<Option<JoinHandle<()>>>,
    next_run_id: AtomicU64,
    /// Channel sender for run events
    tx: mpsc::UnboundedSender<RunEvent>,
    transcript: Arc<dyn TranscriptLogger>,
}

impl<G: LanguageModel + 'static, A: AvailabilityPort + 'static> TaskController<G, A> {
    pub fn new(
        model: Arc<G>,
        availability: Arc<A>,
        config: PlaygroundConfig,
        tx: mpsc::UnboundedSender<RunEvent>,
    ) -> Self {
        Self {
            use_case: Arc::new(RunPromptUseCase::new(model, *config.sampling())),
            availability,
            selector: Mutex::new(ModeSelector::with_mode(config.initial_mode())),
            shared: Arc::new(Mutex::new(ControllerState::default())),
            task: Mutex::new(None),
            next_run_id: AtomicU64::new(0),
            tx,
            transcript: Arc::new(NoTranscriptLogger),
        }
    }

    /// Set a transcript logger for this controller and its runs.
    pub fn with_transcript_logger(mut self, logger: Arc<dyn TranscriptLogger>) -> Self {
        self.use_case = Arc::new(
            (*self.use_case)
                .clone()
                .with_transcript_logger(Arc::clone(&logger)),
        );
        self.transcript = logger;
        self
    }

    // ==================== Mode selection ====================

    /// Replace the active mode. Does not affect a run in progress.
    pub fn select_mode(&self, mode: PromptMode) {
        let previous = self
            .selector
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .select(mode);
        debug!(from = previous.as_str(), to = mode.as_str(), "Mode selected");
        let _ = self.tx.send(RunEvent::ModeChanged {
            mode,
            label: mode.label().to_string(),
            description: mode.description().to_string(),
        });
    }

    pub fn current_mode(&self) -> PromptMode {
        self.selector
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .current()
    }

    // ==================== Lifecycle ====================

    pub fn state(&self) -> RunState {
        lock(&self.shared).state
    }

    pub fn is_running(&self) -> bool {
        !self.state().is_idle()
    }

    /// Terminal state of the most recently finished run
    pub fn last_outcome(&self) -> Option<RunState> {
        lock(&self.shared).last_outcome
    }

    /// Submit a question in the currently selected mode.
    ///
    /// Rejections are reported to the UI as a status line.
    pub async fn submit(&self, text: &str) -> Result<RunId, StartError> {
        let mode = self.current_mode();
        self.start(mode, text).await.inspect_err(|e| {
            let _ = self.tx.send(RunEvent::Status(e.status_message().to_string()));
        })
    }

    /// Start a run and return immediately; the run continues in the background.
    pub async fn start(&self, mode: PromptMode, input: &str) -> Result<RunId, StartError> {
        if !self.state().is_idle() {
            warn!("Rejected start: a run is already in progress");
            return Err(StartError::AlreadyRunning);
        }
        if !mode.allows_submission() {
            return Err(StartError::NoModeSelected);
        }
        let question = Question::try_new(input).ok_or(StartError::EmptyInput)?;

        if let Err(reason) = self.availability.availability().await.into_result() {
            info!(?reason, "Model unavailable, run not started");
            return Err(StartError::ModelUnavailable(reason));
        }

        // The availability check awaited, so re-check under the lock
        let (run_id, cancellation) = {
            let mut guard = lock(&self.shared);
            if !guard.state.is_idle() {
                return Err(StartError::AlreadyRunning);
            }
            let run_id = RunId(self.next_run_id.fetch_add(1, Ordering::SeqCst) + 1);
            let cancellation = CancellationToken::new();
            guard.state = RunState::Running;
            guard.active = Some(ActiveRun {
                id: run_id,
                cancellation: cancellation.clone(),
            });
            (run_id, cancellation)
        };

        info!(run = %run_id, mode = mode.as_str(), "Run started");
        self.transcript.log(TranscriptEvent::new(
            "run_started",
            serde_json::json!({
                "run": run_id.0,
                "mode": mode.as_str(),
                "question": question.content(),
            }),
        ));
        let _ = self.tx.send(RunEvent::Started { run_id, mode });

        let use_case = Arc::clone(&self.use_case);
        let shared = Arc::clone(&self.shared);
        let tx = self.tx.clone();
        let transcript = Arc::clone(&self.transcript);

        let handle = tokio::spawn(async move {
            let mut run = PromptRun::new(run_id, mode, question);
            let progress = RunProgress {
                run_id,
                shared: Arc::clone(&shared),
                tx: tx.clone(),
            };
            let result = use_case
                .execute_with_progress(&mut run, &progress, &cancellation)
                .await;
            Self::finish(&shared, &tx, transcript.as_ref(), run_id, result);
        });

        *self
            .task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handle);

        Ok(run_id)
    }

    /// Request cancellation of the active run.
    ///
    /// Returns the cancelled run's id, or `None` when nothing is running.
    /// The "Canceled." status is emitted immediately; any response still in
    /// flight is discarded when it arrives.
    pub fn cancel(&self) -> Option<RunId> {
        let mut guard = lock(&self.shared);
        if guard.state != RunState::Running {
            return None;
        }
        let run_id = guard.active.as_ref()?.id;
        if let Some(active) = &guard.active {
            active.cancellation.cancel();
        }
        guard.state = RunState::Cancelled;

        info!(run = %run_id, "Run cancelled");
        self.transcript.log(TranscriptEvent::new(
            "run_canceled",
            serde_json::json!({ "run": run_id.0 }),
        ));
        let _ = self.tx.send(RunEvent::Status(CANCELED_STATUS.to_string()));
        let _ = self.tx.send(RunEvent::Canceled { run_id });
        Some(run_id)
    }

    /// Wait for the background task of the latest run to finish.
    pub async fn wait(&self) {
        let handle = self
            .task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let Some(handle) = handle else {
            return;
        };
        if let Err(e) = handle.await {
            warn!("Run task ended abnormally: {}", e);
            let mut guard = lock(&self.shared);
            guard.active = None;
            guard.state = RunState::Idle;
            guard.last_outcome = Some(RunState::Failed);
        }
    }

    /// Settle a finished run: surface its outcome, then return to Idle.
    ///
    /// Runs entirely under the lock so `cancel` and completion cannot both
    /// report the same run.
    fn finish(
        shared: &SharedState,
        tx: &mpsc::UnboundedSender<RunEvent>,
        transcript: &dyn TranscriptLogger,
        run_id: RunId,
        result: Result<String, RunPromptError>,
    ) {
        let mut guard = lock(shared);

        let outcome = if guard.state == RunState::Cancelled {
            debug!(run = %run_id, "Discarding output of cancelled run");
            RunState::Cancelled
        } else {
            match result {
                Ok(answer) => {
                    let _ = tx.send(RunEvent::Result { run_id, answer });
                    RunState::Completed
                }
                Err(RunPromptError::Cancelled) => {
                    let _ = tx.send(RunEvent::Status(CANCELED_STATUS.to_string()));
                    let _ = tx.send(RunEvent::Canceled { run_id });
                    RunState::Cancelled
                }
                Err(e) => {
                    warn!(run = %run_id, "Run failed: {}", e);
                    transcript.log(TranscriptEvent::new(
                        "run_failed",
                        serde_json::json!({
                            "run": run_id.0,
                            "error": e.to_string(),
                        }),
                    ));
                    let _ = tx.send(RunEvent::Error {
                        run_id,
                        message: format!("Error: {}", e),
                    });
                    RunState::Failed
                }
            }
        };

        guard.active = None;
        guard.last_outcome = Some(outcome);
        guard.state = RunState::Idle;
    }
}
