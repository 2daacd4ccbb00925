//! Remote update sequencer: runs login → upload → profile update as one
//! all-or-nothing attempt.
//!
//! Flow: `Idle → LoggingIn → Uploading → Applying → Succeeded`, or
//! `Failed { step, .. }` from whichever step broke. There is no resume from
//! the middle: every run re-authenticates and re-uploads.
//!
//! At most one run is in flight. A trigger that arrives while a run is active
//! is dropped with a `RunSkipped` event and `SequenceError::Busy`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::Config;
use crate::journal::{EventSink, SequenceEvent};
use crate::portal::PortalTransport;
use crate::refresh::apply::apply_to_profile;
use crate::refresh::authenticate::{authenticate, Credentials};
use crate::refresh::upload::{upload_document, UploadKeys};
use crate::refresh::{RemoteFileReference, SequenceError, Step, StepError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceState {
    Idle,
    LoggingIn,
    Uploading,
    Applying,
    Succeeded,
    Failed { step: Step, reason: String },
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceState::Idle => f.write_str("idle"),
            SequenceState::LoggingIn => f.write_str("logging in"),
            SequenceState::Uploading => f.write_str("uploading"),
            SequenceState::Applying => f.write_str("applying"),
            SequenceState::Succeeded => f.write_str("succeeded"),
            SequenceState::Failed { step, reason } => write!(f, "failed at {step}: {reason}"),
        }
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub trigger: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub file_reference: RemoteFileReference,
    /// Every state the run passed through, starting at `Idle`.
    pub transitions: Vec<SequenceState>,
}

impl RunReport {
    /// One-line description for logs and the manual trigger response.
    pub fn summary(&self) -> String {
        let path = self
            .transitions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        format!(
            "run {} ({}) {path} in {}ms, file reference {}",
            self.run_id,
            self.trigger,
            (self.finished_at - self.started_at).num_milliseconds(),
            self.file_reference
        )
    }
}

pub struct Sequencer {
    transport: Arc<dyn PortalTransport>,
    config: Config,
    sink: Arc<dyn EventSink>,
    in_flight: Mutex<()>,
}

impl Sequencer {
    pub fn new(
        transport: Arc<dyn PortalTransport>,
        config: Config,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            transport,
            config,
            sink,
            in_flight: Mutex::new(()),
        }
    }

    /// Runs one full update. `trigger` labels the run in the log
    /// (e.g. `"08:30"`, `"manual"`).
    pub async fn run(&self, trigger: &str) -> Result<RunReport, SequenceError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            self.sink.record(SequenceEvent::RunSkipped {
                trigger: trigger.to_string(),
            });
            return Err(SequenceError::Busy);
        };

        let mut run = RunTracker::begin(trigger, self.sink.as_ref());
        let transport = self.transport.as_ref();
        let sink = self.sink.as_ref();
        let config = &self.config;

        run.enter(SequenceState::LoggingIn);
        let credentials = Credentials {
            username: &config.email,
            password: &config.password,
        };
        let session = match authenticate(transport, credentials, sink).await {
            Ok(s) => s,
            Err(cause) => return Err(run.fail(Step::LoggingIn, cause)),
        };

        run.enter(SequenceState::Uploading);
        let keys = UploadKeys {
            form_key: &config.form_key,
            file_key: &config.file_key,
            allow_file_key_fallback: config.allow_file_key_fallback,
        };
        let reference = match upload_document(transport, &config.resume_path, keys, sink).await {
            Ok(r) => r,
            Err(cause) => return Err(run.fail(Step::Uploading, cause)),
        };

        run.enter(SequenceState::Applying);
        let applied = apply_to_profile(
            transport,
            session,
            reference.clone(),
            &config.form_key,
            sink,
        )
        .await;
        if let Err(cause) = applied {
            return Err(run.fail(Step::Applying, cause));
        }

        Ok(run.succeed(reference))
    }
}

struct RunTracker<'a> {
    run_id: Uuid,
    trigger: String,
    started_at: DateTime<Utc>,
    transitions: Vec<SequenceState>,
    sink: &'a dyn EventSink,
}

impl<'a> RunTracker<'a> {
    fn begin(trigger: &str, sink: &'a dyn EventSink) -> Self {
        let run_id = Uuid::new_v4();
        sink.record(SequenceEvent::RunStarted {
            run_id,
            trigger: trigger.to_string(),
        });
        Self {
            run_id,
            trigger: trigger.to_string(),
            started_at: Utc::now(),
            transitions: vec![SequenceState::Idle],
            sink,
        }
    }

    fn enter(&mut self, state: SequenceState) {
        self.sink.record(SequenceEvent::Transition {
            run_id: self.run_id,
            state: state.clone(),
        });
        self.transitions.push(state);
    }

    fn fail(mut self, step: Step, cause: StepError) -> SequenceError {
        let reason = cause.to_string();
        self.enter(SequenceState::Failed {
            step,
            reason: reason.clone(),
        });
        self.sink.record(SequenceEvent::RunFailed {
            run_id: self.run_id,
            reason,
        });
        SequenceError::Failed { step, cause }
    }

    fn succeed(mut self, file_reference: RemoteFileReference) -> RunReport {
        self.enter(SequenceState::Succeeded);
        self.sink.record(SequenceEvent::RunSucceeded {
            run_id: self.run_id,
        });
        RunReport {
            run_id: self.run_id,
            trigger: self.trigger,
            started_at: self.started_at,
            finished_at: Utc::now(),
            file_reference,
            transitions: self.transitions,
        }
    }
}
