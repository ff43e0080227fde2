use agrisathi_core::CoreError;
use agrisathi_feeds::FeedError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("feed client setup failed: {0}")]
    Feed(#[from] FeedError),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        error!(error = %self, "dashboard request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
