use std::sync::Arc;

use crate::refresh::Sequencer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The same sequencer the scheduler drives, so manual and scheduled
    /// runs share one single-flight guard.
    pub sequencer: Arc<Sequencer>,
}
