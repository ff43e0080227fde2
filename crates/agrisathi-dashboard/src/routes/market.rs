//! Market prices tab and CSV export.

use agrisathi_core::market::{
    self, CSV_COLUMNS, DEFAULT_DISTRICT, DEFAULT_STATE, districts, export_file_name, state_names,
};
use agrisathi_feeds::MarketClient;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use minijinja::context;
use serde::Deserialize;
use tracing::info;

use crate::DashboardError;
use crate::render::Banner;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct MarketQuery {
    pub state: Option<String>,
    pub district: Option<String>,
    /// Present when the user asked for a live lookup.
    pub refresh: Option<String>,
}

/// Selected state and district, with defaults applied.
///
/// Unknown states are kept as typed; their district list is `[DEFAULT_DISTRICT]`.
/// A district not offered for the state falls back to the first offered one.
fn selection(query: &MarketQuery) -> (String, String) {
    let state = query
        .state
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_STATE.to_string());
    let offered = districts(&state);
    let district = match query.district.as_deref() {
        Some(d) if offered.contains(&d) => d.to_string(),
        _ => offered.first().copied().unwrap_or(DEFAULT_DISTRICT).to_string(),
    };
    (state, district)
}

/// GET /market?state=&district=&refresh=
pub async fn market(
    State(app): State<SharedState>,
    Query(query): Query<MarketQuery>,
) -> Result<Html<String>, DashboardError> {
    let (state, district) = selection(&query);

    let (prices, banner, download) = if query.refresh.is_some() {
        let prices = app.market.prices(&state, &district).await;
        let banner = if prices.is_fallback() {
            Banner::warning(format!(
                "⚠️ No real-time data available for {district}, {state}. \
                 Showing sample data for reference."
            ))
        } else {
            Banner::success(format!("✅ Real-time market data for {district}, {state}"))
        };
        // The link carries the rows shown on this page, not a fresh lookup.
        let csv = market::to_csv(&prices.records)?;
        let download = context! {
            csv => urlencoding::encode(&csv),
            file_name => export_file_name(&district, chrono::Local::now().date_naive()),
        };
        (prices, banner, Some(download))
    } else {
        (
            MarketClient::fallback(&state, &district),
            Banner::info("Click 'Refresh Market Prices' to fetch latest market data"),
            None,
        )
    };

    app.templates.render(
        "market.html",
        context! {
            active => "market",
            states => state_names().collect::<Vec<_>>(),
            districts => districts(&state),
            state => state,
            district => district,
            columns => CSV_COLUMNS,
            records => prices.records,
            source => prices.source,
            banner => banner,
            download => download,
        },
    )
}

/// GET /market/export?state=&district=
///
/// Runs its own lookup (with the usual fallback) and returns it as a CSV
/// attachment. The rows can differ from an earlier page view if the feed
/// changed in between; the page's download link embeds the rows it showed.
pub async fn export(
    State(app): State<SharedState>,
    Query(query): Query<MarketQuery>,
) -> Result<impl IntoResponse, DashboardError> {
    let (state, district) = selection(&query);
    let prices = app.market.prices(&state, &district).await;
    let csv = market::to_csv(&prices.records)?;
    let file_name = export_file_name(&district, chrono::Local::now().date_naive());

    info!(
        state,
        district,
        records = prices.records.len(),
        file = %file_name,
        "exporting market prices"
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        csv,
    ))
}
