pub mod health;
pub mod trigger;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health_handler))
        .route("/health", get(health::health_handler))
        .route(
            "/run-now",
            get(trigger::run_now_handler).post(trigger::run_now_handler),
        )
        .with_state(state)
}
