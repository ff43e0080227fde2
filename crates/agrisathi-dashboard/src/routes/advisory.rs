//! Crop advisory tab.

use agrisathi_core::advisory::{CROPS, crop, crop_names};
use axum::extract::{Query, State};
use axum::response::Html;
use minijinja::context;
use serde::Deserialize;

use crate::DashboardError;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct AdvisoryQuery {
    pub crop: Option<String>,
}

/// GET /advisory?crop=
///
/// Unknown or missing crop names show the first crop in the table.
pub async fn advisory(
    State(state): State<SharedState>,
    Query(query): Query<AdvisoryQuery>,
) -> Result<Html<String>, DashboardError> {
    let record = query
        .crop
        .as_deref()
        .and_then(crop)
        .unwrap_or(&CROPS[0]);

    state.templates.render(
        "advisory.html",
        context! {
            active => "advisory",
            crops => crop_names().collect::<Vec<_>>(),
            crop => record,
        },
    )
}
