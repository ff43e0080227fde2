//! Weather tab.

use agrisathi_core::WeatherSnapshot;
use axum::extract::{Query, State};
use axum::response::Html;
use minijinja::context;
use serde::{Deserialize, Serialize};

use crate::DashboardError;
use crate::render::Banner;
use crate::state::SharedState;

pub const DEFAULT_CITY: &str = "Amritsar";

#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

/// Snapshot formatted for display.
#[derive(Debug, Serialize)]
struct WeatherView {
    temperature: String,
    humidity: String,
    description: String,
    timestamp: String,
}

impl From<WeatherSnapshot> for WeatherView {
    fn from(w: WeatherSnapshot) -> Self {
        Self {
            temperature: w.temperature_display(),
            humidity: w.humidity_display(),
            description: w.description,
            timestamp: w.timestamp,
        }
    }
}

/// GET /weather?city=
pub async fn weather(
    State(state): State<SharedState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Html<String>, DashboardError> {
    let Some(city) = query.city.filter(|c| !c.trim().is_empty()) else {
        return state.templates.render(
            "weather.html",
            context! {
                active => "weather",
                city => DEFAULT_CITY,
                banner => Banner::info(
                    "Enter a city and click 'Get Weather' to see current conditions"
                ),
            },
        );
    };

    let (snapshot, banner) = match state.weather.current(city.trim()).await {
        Some(w) => (w, None),
        None => (
            WeatherSnapshot::demo_fallback(),
            Some(Banner::error("Weather fetch failed. Using demo data.")),
        ),
    };

    state.templates.render(
        "weather.html",
        context! {
            active => "weather",
            city => city,
            banner => banner,
            weather => WeatherView::from(snapshot),
        },
    )
}
