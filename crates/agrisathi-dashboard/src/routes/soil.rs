//! Soil health tab: optional CSV upload, otherwise sample metrics.

use agrisathi_core::SoilTable;
use agrisathi_core::soil::SAMPLE_METRICS;
use axum::extract::State;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::response::Html;
use minijinja::context;
use tracing::{info, warn};

use crate::DashboardError;
use crate::render::Banner;
use crate::state::SharedState;

/// Multipart field carrying the CSV.
pub const SOIL_FIELD: &str = "soil";

/// GET /soil
pub async fn soil_form(State(state): State<SharedState>) -> Result<Html<String>, DashboardError> {
    render(&state, None, None)
}

/// POST /soil
///
/// An empty or absent upload shows the sample metrics. A CSV that cannot be
/// read shows an error banner alongside them.
pub async fn soil_upload(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Html<String>, DashboardError> {
    let upload = match multipart {
        Ok(multipart) => read_soil_field(multipart).await,
        Err(e) => Err(e.body_text()),
    };

    match upload {
        Ok(None) => render(&state, None, None),
        Ok(Some(bytes)) => match SoilTable::from_csv(&bytes) {
            Ok(table) if table.is_empty() => render(&state, None, None),
            Ok(table) => {
                info!(
                    columns = table.headers.len(),
                    rows = table.rows.len(),
                    "soil table uploaded"
                );
                render(&state, Some(table), None)
            }
            Err(e) => {
                warn!(error = %e, "could not parse soil csv");
                render(&state, None, Some(Banner::error(format!("Could not read soil CSV: {e}"))))
            }
        },
        Err(msg) => {
            warn!(error = %msg, "soil upload failed");
            render(&state, None, Some(Banner::error(format!("Upload failed: {msg}"))))
        }
    }
}

fn render(
    state: &SharedState,
    table: Option<SoilTable>,
    banner: Option<Banner>,
) -> Result<Html<String>, DashboardError> {
    state.templates.render(
        "soil.html",
        context! {
            active => "soil",
            table => table,
            banner => banner,
            metrics => SAMPLE_METRICS,
        },
    )
}

/// Bytes of the first non-empty `soil` field, if any.
async fn read_soil_field(mut multipart: Multipart) -> Result<Option<Vec<u8>>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        if field.name() == Some(SOIL_FIELD) {
            let data = field.bytes().await.map_err(|e| e.body_text())?;
            if !data.is_empty() {
                return Ok(Some(data.to_vec()));
            }
        }
    }
    Ok(None)
}
