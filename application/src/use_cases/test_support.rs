//! Mock adapters shared by the use case tests.

use crate::ports::language_model::{LanguageModel, ModelError, ModelSession};
use crate::ports::progress::ProgressNotifier;
use crate::ports::transcript_logger::{TranscriptEvent, TranscriptLogger};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thinkstep_domain::{Instruction, SamplingOptions, Stage};

/// What a scripted session does when asked to respond
#[derive(Clone)]
pub enum Reply {
    Text(String),
    Delayed(Duration, String),
    Fail(ModelError),
    /// Never completes
    Hang,
}

impl Reply {
    pub fn text(s: &str) -> Self {
        Reply::Text(s.to_string())
    }

    pub fn delayed(ms: u64, s: &str) -> Self {
        Reply::Delayed(Duration::from_millis(ms), s.to_string())
    }
}

/// A recorded model call
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub instruction: String,
    pub prompt: String,
    pub options: SamplingOptions,
}

/// Model whose sessions reply from a script, in session creation order
#[derive(Default)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<Reply>>,
    calls: Arc<Mutex<Vec<Call>>>,
    prewarms: Arc<Mutex<usize>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(VecDeque::from(replies)),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn prewarm_count(&self) -> usize {
        *self.prewarms.lock().unwrap()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn create_session(
        &self,
        instruction: &Instruction,
        options: &SamplingOptions,
    ) -> Result<Box<dyn ModelSession>, ModelError> {
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ModelError::Other("No more scripted replies".to_string()))?;
        Ok(Box::new(ScriptedSession {
            instruction: instruction.clone(),
            options: *options,
            reply,
            calls: Arc::clone(&self.calls),
            prewarms: Arc::clone(&self.prewarms),
        }))
    }
}

struct ScriptedSession {
    instruction: Instruction,
    options: SamplingOptions,
    reply: Reply,
    calls: Arc<Mutex<Vec<Call>>>,
    prewarms: Arc<Mutex<usize>>,
}

#[async_trait]
impl ModelSession for ScriptedSession {
    fn instruction(&self) -> &Instruction {
        &self.instruction
    }

    async fn prewarm(&self) {
        *self.prewarms.lock().unwrap() += 1;
    }

    async fn respond(&self, prompt: &str) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(Call {
            instruction: self.instruction.as_str().to_string(),
            prompt: prompt.to_string(),
            options: self.options,
        });
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Delayed(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            Reply::Fail(error) => Err(error.clone()),
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// Progress notifier that records every callback
#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressNotifier for RecordingProgress {
    fn on_stage_start(&self, stage: &Stage) {
        self.events.lock().unwrap().push(format!("start:{}", stage));
    }

    fn on_task_complete(&self, stage: &Stage, index: usize, success: bool) {
        self.events
            .lock()
            .unwrap()
            .push(format!("task:{}:{}:{}", stage, index, success));
    }

    fn on_stage_complete(&self, stage: &Stage) {
        self.events.lock().unwrap().push(format!("done:{}", stage));
    }
}

/// Transcript logger that keeps event types in memory
#[derive(Default)]
pub struct MemoryTranscript {
    pub events: Mutex<Vec<(&'static str, serde_json::Value)>>,
}

impl MemoryTranscript {
    pub fn types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

impl TranscriptLogger for MemoryTranscript {
    fn log(&self, event: TranscriptEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type, event.payload));
    }
}
