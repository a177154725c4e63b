//! Run Prompt use case
//!
//! Maps `(mode, question)` to a single final answer by driving the model
//! calls each prompting mode requires.

use crate::ports::language_model::{LanguageModel, ModelError};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};
use std::sync::Arc;
use thinkstep_domain::{
    Instruction, PromptMode, PromptRun, PromptTemplate, SamplingOptions, Stage, preview,
};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Number of chain-of-thought answers compared by self-consistency
const SELF_CONSISTENCY_SAMPLES: usize = 3;

/// Maximum length of answer previews in log fields
const LOG_PREVIEW_LEN: usize = 120;

/// Errors that can occur during a prompt run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunPromptError {
    #[error("No mode selected")]
    NoModeSelected,

    #[error("Run cancelled")]
    Cancelled,

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl RunPromptError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunPromptError::Cancelled)
    }
}

/// Return `Cancelled` if cancellation has been requested.
fn check_cancelled(token: &CancellationToken) -> Result<(), RunPromptError> {
    if token.is_cancelled() {
        return Err(RunPromptError::Cancelled);
    }
    Ok(())
}

/// Use case for answering one question in one prompting mode
pub struct RunPromptUseCase<G: LanguageModel + 'static> {
    model: Arc<G>,
    options: SamplingOptions,
    transcript: Arc<dyn TranscriptLogger>,
}

impl<G: LanguageModel + 'static> Clone for RunPromptUseCase<G> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            options: self.options,
            transcript: Arc::clone(&self.transcript),
        }
    }
}

impl<G: LanguageModel + 'static> RunPromptUseCase<G> {
    pub fn new(model: Arc<G>, options: SamplingOptions) -> Self {
        Self {
            model,
            options,
            transcript: Arc::new(NoTranscriptLogger),
        }
    }

    /// Record candidate, evaluation and final answers to a transcript.
    pub fn with_transcript_logger(mut self, logger: Arc<dyn TranscriptLogger>) -> Self {
        self.transcript = logger;
        self
    }

    pub fn options(&self) -> &SamplingOptions {
        &self.options
    }

    /// Execute without progress reporting or cancellation
    pub async fn execute(&self, run: &mut PromptRun) -> Result<String, RunPromptError> {
        self.execute_with_progress(run, &NoProgress, &CancellationToken::new())
            .await
    }

    /// Execute the run, reporting each stage and honoring cancellation.
    ///
    /// Cancellation is checked before every stage and races every model
    /// call; a response that arrives after cancellation is discarded.
    pub async fn execute_with_progress(
        &self,
        run: &mut PromptRun,
        progress: &dyn ProgressNotifier,
        cancellation: &CancellationToken,
    ) -> Result<String, RunPromptError> {
        info!(run = %run.id(), mode = run.mode().as_str(), "Starting prompt run");

        let answer = match run.mode() {
            PromptMode::None => return Err(RunPromptError::NoModeSelected),
            PromptMode::ZeroShot => {
                self.stage_single(run, Stage::ZeroShot, progress, cancellation)
                    .await?
            }
            PromptMode::ZeroShotCoT => {
                self.stage_single(run, Stage::ZeroShotCoT, progress, cancellation)
                    .await?
            }
            PromptMode::SelfConsistency => {
                self.self_consistency(run, progress, cancellation).await?
            }
        };

        self.transcript.log(TranscriptEvent::new(
            "final_answer",
            serde_json::json!({
                "run": run.id().0,
                "answer": answer,
            }),
        ));
        info!(run = %run.id(), "Prompt run complete");
        Ok(answer)
    }

    /// Zero-shot and zero-shot-CoT: one call, answer returned verbatim
    async fn stage_single(
        &self,
        run: &mut PromptRun,
        stage: Stage,
        progress: &dyn ProgressNotifier,
        cancellation: &CancellationToken,
    ) -> Result<String, RunPromptError> {
        check_cancelled(cancellation)?;
        run.set_stage(stage);
        progress.on_stage_start(&stage);

        let instruction = PromptTemplate::answer_instruction(run.mode());
        let result = self
            .generate_cancellable(&instruction, run.question().content(), cancellation)
            .await;

        progress.on_task_complete(&stage, 0, result.is_ok());
        let answer = result?;
        progress.on_stage_complete(&stage);
        Ok(answer)
    }

    /// Self-consistency: three answers, then merge-to-two, then merge-to-one
    async fn self_consistency(
        &self,
        run: &mut PromptRun,
        progress: &dyn ProgressNotifier,
        cancellation: &CancellationToken,
    ) -> Result<String, RunPromptError> {
        let answers = self.stage_initial(run, progress, cancellation).await?;

        let evaluation = self
            .stage_reduce(
                run,
                Stage::Evaluation,
                PromptTemplate::evaluation_instruction(),
                &PromptTemplate::evaluation_prompt(&answers),
                progress,
                cancellation,
            )
            .await?;
        debug!(run = %run.id(), evaluation = %preview(&evaluation, LOG_PREVIEW_LEN), "Evaluation output");
        self.transcript.log(TranscriptEvent::new(
            "evaluation",
            serde_json::json!({
                "run": run.id().0,
                "text": evaluation,
            }),
        ));

        self.stage_reduce(
            run,
            Stage::Result,
            PromptTemplate::result_instruction(),
            &evaluation,
            progress,
            cancellation,
        )
        .await
    }

    /// Stage 1: query the model three times concurrently and join positionally
    async fn stage_initial(
        &self,
        run: &mut PromptRun,
        progress: &dyn ProgressNotifier,
        cancellation: &CancellationToken,
    ) -> Result<[String; SELF_CONSISTENCY_SAMPLES], RunPromptError> {
        let stage = Stage::InitialAnswers;
        check_cancelled(cancellation)?;
        run.set_stage(stage);
        progress.on_stage_start(&stage);

        let instruction = PromptTemplate::answer_instruction(run.mode());
        let mut join_set = JoinSet::new();

        for index in 0..SELF_CONSISTENCY_SAMPLES {
            check_cancelled(cancellation)?;
            let model = Arc::clone(&self.model);
            let instruction = instruction.clone();
            let input = run.question().content().to_string();
            let options = self.options;

            join_set.spawn(async move {
                let result = model.generate(&instruction, &input, &options).await;
                (index, result)
            });
        }

        let mut answers: [Option<String>; SELF_CONSISTENCY_SAMPLES] = Default::default();

        loop {
            // Dropping the JoinSet on any early return aborts the remaining calls
            let joined = tokio::select! {
                biased;
                _ = cancellation.cancelled() => return Err(RunPromptError::Cancelled),
                joined = join_set.join_next() => joined,
            };
            let Some(joined) = joined else { break };

            match joined {
                Ok((index, Ok(answer))) => {
                    debug!(
                        run = %run.id(),
                        index = index + 1,
                        answer = %preview(&answer, LOG_PREVIEW_LEN),
                        "Initial answer received"
                    );
                    progress.on_task_complete(&stage, index, true);
                    self.transcript.log(TranscriptEvent::new(
                        "candidate_answer",
                        serde_json::json!({
                            "run": run.id().0,
                            "index": index + 1,
                            "text": answer,
                        }),
                    ));
                    answers[index] = Some(answer);
                }
                Ok((index, Err(e))) => {
                    warn!(run = %run.id(), index = index + 1, "Initial answer failed: {}", e);
                    progress.on_task_complete(&stage, index, false);
                    return Err(e.into());
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                    return Err(ModelError::Other(format!("initial answer task failed: {}", e)).into());
                }
            }
        }

        progress.on_stage_complete(&stage);

        match answers {
            [Some(first), Some(second), Some(third)] => Ok([first, second, third]),
            _ => Err(ModelError::Other("missing initial answer".to_string()).into()),
        }
    }

    /// Stages 2 and 3: one sequential call over the previous stage's output
    async fn stage_reduce(
        &self,
        run: &mut PromptRun,
        stage: Stage,
        instruction: Instruction,
        input: &str,
        progress: &dyn ProgressNotifier,
        cancellation: &CancellationToken,
    ) -> Result<String, RunPromptError> {
        check_cancelled(cancellation)?;
        run.set_stage(stage);
        progress.on_stage_start(&stage);

        let result = self
            .generate_cancellable(&instruction, input, cancellation)
            .await;

        progress.on_task_complete(&stage, 0, result.is_ok());
        let output = result?;
        progress.on_stage_complete(&stage);
        Ok(output)
    }

    /// One model call that gives up as soon as cancellation is requested
    async fn generate_cancellable(
        &self,
        instruction: &Instruction,
        input: &str,
        cancellation: &CancellationToken,
    ) -> Result<String, RunPromptError> {
        check_cancelled(cancellation)?;
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(RunPromptError::Cancelled),
            result = self.model.generate(instruction, input, &self.options) => Ok(result?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{MemoryTranscript, RecordingProgress, Reply, ScriptedModel};
    use std::time::Duration;
    use thinkstep_domain::{Question, RunId};

    fn run(mode: PromptMode, question: &str) -> PromptRun {
        PromptRun::new(RunId(1), mode, Question::try_new(question).unwrap())
    }

    fn use_case(model: &Arc<ScriptedModel>) -> RunPromptUseCase<ScriptedModel> {
        RunPromptUseCase::new(Arc::clone(model), SamplingOptions::default())
    }

    #[tokio::test]
    async fn test_zero_shot_single_call_with_empty_instruction() {
        let model = Arc::new(ScriptedModel::new(vec![Reply::text("4")]));
        let mut run = run(PromptMode::ZeroShot, "What is 2+2?");

        let answer = use_case(&model).execute(&mut run).await.unwrap();

        assert_eq!(answer, "4");
        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].instruction, "");
        assert_eq!(calls[0].prompt, "What is 2+2?");
        assert_eq!(calls[0].options, SamplingOptions::default());
        assert_eq!(model.prewarm_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_shot_cot_returns_answer_verbatim() {
        let raw = "  Step 1: the sky scatters blue light.\n\nSo: yes.\n";
        let model = Arc::new(ScriptedModel::new(vec![Reply::text(raw)]));
        let mut run = run(PromptMode::ZeroShotCoT, "Is the sky blue?");

        let answer = use_case(&model).execute(&mut run).await.unwrap();

        assert_eq!(answer, raw);
        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].instruction, "Let's think step by step.");
        assert_eq!(run.current_stage(), Some(Stage::ZeroShotCoT));
    }

    #[tokio::test]
    async fn test_self_consistency_five_calls_in_order() {
        let model = Arc::new(ScriptedModel::new(vec![
            Reply::text("Yes"),
            Reply::text("Yes"),
            Reply::text("No"),
            Reply::text("Both agree: Yes"),
            Reply::text("Yes, the sky is blue."),
        ]));
        let mut run = run(PromptMode::SelfConsistency, "Is the sky blue?");

        let answer = use_case(&model).execute(&mut run).await.unwrap();

        assert_eq!(answer, "Yes, the sky is blue.");
        let calls = model.calls();
        assert_eq!(calls.len(), 5);
        for call in &calls[..3] {
            assert_eq!(call.instruction, PromptTemplate::CHAIN_OF_THOUGHT);
            assert_eq!(call.prompt, "Is the sky blue?");
        }
        assert_eq!(calls[3].instruction, PromptTemplate::SELF_CONSISTENCY_EVALUATION);
        assert_eq!(calls[3].prompt, "SOLUTION 1: Yes SOLUTION 2: Yes SOLUTION 3: No");
        assert_eq!(calls[4].instruction, PromptTemplate::SELF_CONSISTENCY_RESULT);
        assert_eq!(calls[4].prompt, "Both agree: Yes");
        assert_eq!(run.current_stage(), Some(Stage::Result));
    }

    #[tokio::test]
    async fn test_self_consistency_joins_by_position_not_arrival() {
        // First-dispatched call finishes last
        let model = Arc::new(ScriptedModel::new(vec![
            Reply::delayed(60, "A"),
            Reply::delayed(30, "B"),
            Reply::delayed(1, "C"),
            Reply::text("merged"),
            Reply::text("final"),
        ]));
        let progress = RecordingProgress::default();
        let mut run = run(PromptMode::SelfConsistency, "Pick a letter");

        let answer = use_case(&model)
            .execute_with_progress(&mut run, &progress, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(answer, "final");
        assert_eq!(
            model.calls()[3].prompt,
            "SOLUTION 1: A SOLUTION 2: B SOLUTION 3: C"
        );
        let events = progress.events();
        assert_eq!(
            &events[1..4],
            &[
                "task:initial_answers:2:true".to_string(),
                "task:initial_answers:1:true".to_string(),
                "task:initial_answers:0:true".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_stage_events_in_strict_order() {
        let model = Arc::new(ScriptedModel::new(vec![
            Reply::text("a"),
            Reply::text("b"),
            Reply::text("c"),
            Reply::text("ab"),
            Reply::text("final"),
        ]));
        let progress = RecordingProgress::default();
        let mut run = run(PromptMode::SelfConsistency, "q");

        use_case(&model)
            .execute_with_progress(&mut run, &progress, &CancellationToken::new())
            .await
            .unwrap();

        let starts: Vec<_> = progress
            .events()
            .into_iter()
            .filter(|e| e.starts_with("start:"))
            .collect();
        assert_eq!(
            starts,
            vec!["start:initial_answers", "start:evaluation", "start:result"]
        );
    }

    #[tokio::test]
    async fn test_failed_initial_answer_aborts_run() {
        let model = Arc::new(ScriptedModel::new(vec![
            Reply::text("Yes"),
            Reply::Fail(ModelError::RequestFailed("boom".to_string())),
            Reply::text("No"),
            Reply::text("unused"),
            Reply::text("unused"),
        ]));
        let mut run = run(PromptMode::SelfConsistency, "Is the sky blue?");

        let err = use_case(&model).execute(&mut run).await.unwrap_err();

        assert_eq!(
            err,
            RunPromptError::Model(ModelError::RequestFailed("boom".to_string()))
        );
        assert!(
            model
                .calls()
                .iter()
                .all(|c| c.instruction == PromptTemplate::CHAIN_OF_THOUGHT)
        );
    }

    #[tokio::test]
    async fn test_failed_evaluation_produces_no_partial_output() {
        let model = Arc::new(ScriptedModel::new(vec![
            Reply::text("1"),
            Reply::text("1"),
            Reply::text("2"),
            Reply::Fail(ModelError::Timeout),
        ]));
        let mut run = run(PromptMode::SelfConsistency, "q");

        let err = use_case(&model).execute(&mut run).await.unwrap_err();

        assert_eq!(err, RunPromptError::Model(ModelError::Timeout));
        assert_eq!(model.call_count(), 4);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_makes_no_calls() {
        let model = Arc::new(ScriptedModel::new(vec![Reply::text("4")]));
        let token = CancellationToken::new();
        token.cancel();
        let mut run = run(PromptMode::ZeroShot, "What is 2+2?");

        let err = use_case(&model)
            .execute_with_progress(&mut run, &NoProgress, &token)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_during_initial_answers_discards_results() {
        let model = Arc::new(ScriptedModel::new(vec![
            Reply::Hang,
            Reply::text("b"),
            Reply::text("c"),
            Reply::text("unused"),
            Reply::text("unused"),
        ]));
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });
        let mut run = run(PromptMode::SelfConsistency, "q");

        let err = use_case(&model)
            .execute_with_progress(&mut run, &NoProgress, &token)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(model.call_count() <= 3);
        assert_eq!(run.current_stage(), Some(Stage::InitialAnswers));
    }

    #[tokio::test]
    async fn test_none_mode_is_rejected() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let mut run = run(PromptMode::None, "q");

        let err = use_case(&model).execute(&mut run).await.unwrap_err();

        assert_eq!(err, RunPromptError::NoModeSelected);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_transcript_records_candidates_and_final_answer() {
        let model = Arc::new(ScriptedModel::new(vec![
            Reply::text("a"),
            Reply::text("b"),
            Reply::text("c"),
            Reply::text("ab"),
            Reply::text("final"),
        ]));
        let transcript = Arc::new(MemoryTranscript::default());
        let use_case = use_case(&model).with_transcript_logger(transcript.clone());
        let mut run = run(PromptMode::SelfConsistency, "q");

        use_case.execute(&mut run).await.unwrap();

        let types = transcript.types();
        assert_eq!(
            types.iter().filter(|t| **t == "candidate_answer").count(),
            3
        );
        assert_eq!(&types[3..], &["evaluation", "final_answer"]);
    }
}
