use axum::extract::State;

use crate::errors::AppError;
use crate::state::AppState;

const MANUAL_TRIGGER: &str = "manual";

/// GET|POST /run-now
/// Runs the full update synchronously and reports the outcome as plain text.
pub async fn run_now_handler(State(state): State<AppState>) -> Result<String, AppError> {
    let report = state.sequencer.run(MANUAL_TRIGGER).await?;
    Ok(format!("Resume updated: {}", report.summary()))
}
