//! Transport log: the single place sequence events are written.
//!
//! Steps never print or touch files directly. They hand a `SequenceEvent`
//! to an injected `EventSink`; production uses `TransportLog`, which appends
//! a timestamped line to the log file and mirrors it to `tracing`.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::refresh::{ReferenceSource, SequenceState};

const BANNER: &str = "========================================";

/// Everything a run reports about itself.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceEvent {
    RunStarted { run_id: Uuid, trigger: String },
    RunSkipped { trigger: String },
    Transition { run_id: Uuid, state: SequenceState },
    LoginAttempt,
    LoginSucceeded { token_preview: String, cookies_obtained: bool },
    LoginFailed { status: Option<u16>, detail: String },
    UploadStarted { file_name: String },
    UploadResponse { body: String },
    FileReferenceResolved { reference: String, source: ReferenceSource },
    UploadFailed { status: Option<u16>, detail: String },
    ProfileUpdating,
    ProfileUpdated { body: String },
    ProfileUpdateFailed { status: Option<u16>, detail: String },
    RunSucceeded { run_id: Uuid },
    RunFailed { run_id: Uuid, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl SequenceEvent {
    pub fn severity(&self) -> Severity {
        match self {
            SequenceEvent::LoginFailed { .. }
            | SequenceEvent::UploadFailed { .. }
            | SequenceEvent::ProfileUpdateFailed { .. }
            | SequenceEvent::RunFailed { .. } => Severity::Error,
            SequenceEvent::RunSkipped { .. } => Severity::Warn,
            SequenceEvent::FileReferenceResolved {
                source: ReferenceSource::ConfiguredFallback,
                ..
            } => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for SequenceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceEvent::RunStarted { run_id, trigger } => write!(
                f,
                "{BANNER}\nStarting resume update process (run {run_id}, trigger: {trigger})..."
            ),
            SequenceEvent::RunSkipped { trigger } => write!(
                f,
                "Skipping trigger '{trigger}': another update is still running"
            ),
            SequenceEvent::Transition { run_id, state } => {
                write!(f, "Run {run_id} -> {state}")
            }
            SequenceEvent::LoginAttempt => f.write_str("Logging in to Naukri..."),
            SequenceEvent::LoginSucceeded {
                token_preview,
                cookies_obtained,
            } => {
                write!(f, "Login successful! Auth token obtained: {token_preview}")?;
                if *cookies_obtained {
                    f.write_str(" (session cookies obtained)")?;
                }
                Ok(())
            }
            SequenceEvent::LoginFailed { status, detail } => {
                write_failure(f, "Login failed", *status, detail)
            }
            SequenceEvent::UploadStarted { file_name } => {
                write!(f, "Starting resume upload of {file_name}...")
            }
            SequenceEvent::UploadResponse { body } => {
                write!(f, "Upload accepted. Response: {body}")
            }
            SequenceEvent::FileReferenceResolved { reference, source } => {
                write!(f, "Using fileKey: {reference} ({source})")
            }
            SequenceEvent::UploadFailed { status, detail } => {
                write_failure(f, "Upload failed", *status, detail)
            }
            SequenceEvent::ProfileUpdating => f.write_str("Updating profile..."),
            SequenceEvent::ProfileUpdated { body } => {
                write!(f, "Profile updated successfully. Response: {body}")
            }
            SequenceEvent::ProfileUpdateFailed { status, detail } => {
                write_failure(f, "Profile update failed", *status, detail)
            }
            SequenceEvent::RunSucceeded { run_id } => write!(
                f,
                "Resume update completed successfully (run {run_id})\n{BANNER}"
            ),
            SequenceEvent::RunFailed { run_id, reason } => write!(
                f,
                "Resume update failed (run {run_id}): {reason}\n{BANNER}"
            ),
        }
    }
}

fn write_failure(
    f: &mut fmt::Formatter<'_>,
    what: &str,
    status: Option<u16>,
    detail: &str,
) -> fmt::Result {
    match status {
        Some(status) => write!(f, "{what}: status {status}, response: {detail}"),
        None => write!(f, "{what}: {detail}"),
    }
}

/// Injected logging capability. One method, so steps stay trivially testable.
pub trait EventSink: Send + Sync {
    fn record(&self, event: SequenceEvent);
}

/// Append-only text log plus console mirror.
pub struct TransportLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl TransportLog {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open transport log {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    fn append(&self, message: &str) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut file = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for line in message.lines() {
            if let Err(e) = writeln!(file, "[{timestamp}] {line}") {
                // Console still has the event; a broken log file must not fail the run.
                warn!("Could not write to {}: {e}", self.path.display());
                return;
            }
        }
    }
}

impl EventSink for TransportLog {
    fn record(&self, event: SequenceEvent) {
        let message = event.to_string();
        match event.severity() {
            Severity::Info => info!("{message}"),
            Severity::Warn => warn!("{message}"),
            Severity::Error => error!("{message}"),
        }
        self.append(&message);
    }
}
