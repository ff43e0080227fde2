//! Disease detection tab. The file picker is not wired to the inference service.

use axum::extract::State;
use axum::response::Html;
use minijinja::context;

use crate::DashboardError;
use crate::render::Banner;
use crate::state::SharedState;

/// GET /disease
pub async fn disease(State(state): State<SharedState>) -> Result<Html<String>, DashboardError> {
    state.templates.render(
        "disease.html",
        context! {
            active => "disease",
            banner => Banner::info("Upload a leaf image — model integration to be added."),
        },
    )
}
