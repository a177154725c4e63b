//! Append-only transcript of playground runs.
//!
//! One line per [`TranscriptEvent`]: the event's own fields plus `type` and
//! an RFC 3339 `timestamp` in UTC.

use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thinkstep_application::ports::transcript_logger::{TranscriptEvent, TranscriptLogger};
use tracing::warn;

/// Writes run transcripts as JSON Lines.
///
/// The file is opened in append mode, so `--transcript runs.jsonl` collects
/// every session in one place. Each line is flushed as soon as it is written.
pub struct JsonlTranscriptLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTranscriptLogger {
    /// Open `path` for appending, creating missing parent directories.
    ///
    /// Failures are logged and yield `None`; the caller runs without a
    /// transcript.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Transcript disabled: cannot create {}: {}", parent.display(), e);
            return None;
        }

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(Self {
                writer: Mutex::new(BufWriter::new(file)),
                path: path.to_path_buf(),
            }),
            Err(e) => {
                warn!("Transcript disabled: cannot open {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Flatten an event into one transcript line.
///
/// Object payloads keep their keys at the top level; anything else is
/// nested under `data`.
fn to_record(event: TranscriptEvent, timestamp: String) -> Value {
    match event.payload {
        Value::Object(mut fields) => {
            fields.insert("type".to_string(), event.event_type.into());
            fields.insert("timestamp".to_string(), timestamp.into());
            Value::Object(fields)
        }
        data => json!({
            "type": event.event_type,
            "timestamp": timestamp,
            "data": data,
        }),
    }
}

impl TranscriptLogger for JsonlTranscriptLogger {
    fn log(&self, event: TranscriptEvent) {
        let event_type = event.event_type;
        let record = to_record(event, Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));

        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        let written = serde_json::to_writer(&mut *writer, &record)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());
        if let Err(e) = written {
            warn!(
                "Could not write {} to transcript {}: {}",
                event_type,
                self.path.display(),
                e
            );
        }
    }
}

impl Drop for JsonlTranscriptLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
