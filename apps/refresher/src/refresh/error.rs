use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The three remote steps of an update sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    LoggingIn,
    Uploading,
    Applying,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::LoggingIn => "login",
            Step::Uploading => "resume upload",
            Step::Applying => "profile update",
        };
        f.write_str(name)
    }
}

/// Why a single step failed. Every variant is terminal for the current run.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Resume file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Profile update failed: {0}")]
    ProfileUpdate(String),
}

/// Outcome of a sequence that did not reach `Succeeded`.
#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("An update sequence is already in progress")]
    Busy,

    /// Displays only the cause: every `StepError` already names what failed.
    #[error("{cause}")]
    Failed { step: Step, cause: StepError },
}

/// Renders a remote failure as `status N: body`, or just the detail when
/// the portal was never reached.
pub(crate) fn describe_failure(status: Option<u16>, detail: &str) -> String {
    match status {
        Some(code) => format!("status {code}: {detail}"),
        None => detail.to_string(),
    }
}
