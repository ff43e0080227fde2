//! AgriSathi inference service.
//!
//! HTTP API accepting an uploaded leaf image and returning the top class
//! label with its confidence. The classifier loads on the first request and
//! stays resident for the life of the process.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::{ApiConfig, AppState, SharedClassifier, SharedState};

/// Build the service router.
pub fn router(state: SharedState) -> Router {
    let body_limit = state.config.body_limit;
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/predict", post(routes::predict::predict))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

/// Router with fresh state built from `config`.
pub fn app(config: ApiConfig) -> Router {
    router(Arc::new(AppState::new(config)))
}
