//! AgriSathi dashboard.
//!
//! Server-rendered five-tab UI: crop advisory, disease detection stub, market
//! prices, weather and soil health. Pages are rendered with minijinja; live
//! data comes from the feed clients in `agrisathi-feeds`, which fall back to
//! synthesised data rather than failing a page.

mod error;
pub mod render;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::response::Redirect;
use axum::routing::get;
use tower_http::trace::TraceLayer;

pub use error::DashboardError;
pub use state::{AppState, DashboardConfig, SharedState};

/// Build the dashboard router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/advisory") }))
        .route("/advisory", get(routes::advisory::advisory))
        .route("/disease", get(routes::disease::disease))
        .route("/market", get(routes::market::market))
        .route("/market/export", get(routes::market::export))
        .route("/weather", get(routes::weather::weather))
        .route(
            "/soil",
            get(routes::soil::soil_form).post(routes::soil::soil_upload),
        )
        .route("/health", get(routes::health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Router with fresh state built from `config`.
pub fn app(config: DashboardConfig) -> Result<Router, DashboardError> {
    Ok(router(Arc::new(AppState::new(config)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrisathi_feeds::{MarketConfig, WeatherConfig, stub};
    use axum::Json;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    const MARKET_PATH: &str = "/resource/9ef84268-d588-465a-a308-a864a43d0070";
    const BOUNDARY: &str = "agrisathi-soil-boundary";

    /// Base URL of a server that answers every market lookup with `body`.
    async fn market_stub(body: serde_json::Value) -> String {
        stub::serve(Router::new().route(
            MARKET_PATH,
            get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        ))
        .await
        .unwrap()
    }

    fn dashboard(weather: WeatherConfig, market: MarketConfig) -> Router {
        app(DashboardConfig { weather, market }).unwrap()
    }

    fn offline() -> Router {
        dashboard(
            WeatherConfig::default(),
            MarketConfig {
                base_url: "http://127.0.0.1:1".into(),
                timeout: Duration::from_secs(2),
                ..Default::default()
            },
        )
    }

    fn market_at(base_url: String) -> MarketConfig {
        MarketConfig {
            base_url,
            timeout: Duration::from_secs(2),
            ..Default::default()
        }
    }

    async fn get_page(app: Router, uri: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn soil_request(field: &str, bytes: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"soil.csv\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: text/csv\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/soil")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    // ── Navigation ──

    #[tokio::test]
    async fn root_redirects_to_advisory() {
        let resp = offline()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(resp.status().is_redirection());
        assert_eq!(resp.headers()[header::LOCATION], "/advisory");
    }

    #[tokio::test]
    async fn every_page_has_tabs_and_footer() {
        let app = offline();
        for uri in ["/advisory", "/disease", "/market", "/weather", "/soil"] {
            let (status, html) = get_page(app.clone(), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            for title in [
                "Crop Advisory",
                "Disease Detection",
                "Market Prices",
                "Weather",
                "Soil Health",
            ] {
                assert!(html.contains(title), "{uri} missing tab {title}");
            }
            assert!(html.contains("Agmarknet"), "{uri} missing footer");
        }
    }

    // ── Advisory ──

    #[tokio::test]
    async fn advisory_shows_selected_crop() {
        let (_, html) = get_page(offline(), "/advisory?crop=Rice").await;
        assert!(html.contains("Clay"));
        assert!(html.contains("Kharif"));
        assert!(html.contains("1200–1500 mm"));
        assert!(html.contains("Brown planthopper, leaf folder"));
        assert!(html.contains(r#"<option value="Rice" selected>"#));
    }

    #[tokio::test]
    async fn advisory_unknown_crop_shows_first() {
        let (status, html) = get_page(offline(), "/advisory?crop=Cotton").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Loamy"));
        assert!(html.contains("Stem borers, aphids"));
    }

    // ── Disease ──

    #[tokio::test]
    async fn disease_is_a_stub() {
        let (_, html) = get_page(offline(), "/disease").await;
        assert!(html.contains("model integration to be added"));
        assert!(html.contains(r#"accept=".jpg,.jpeg,.png""#));
    }

    // ── Market ──

    #[tokio::test]
    async fn market_without_refresh_shows_sample_table() {
        let (_, html) = get_page(offline(), "/market?state=Maharashtra&district=Pune").await;
        assert!(html.contains("to fetch latest market data"));
        assert!(html.contains("₹2400"));
        assert!(html.contains("Aurangabad"));
        assert!(!html.contains("data:text/csv"));
    }

    #[tokio::test]
    async fn market_refresh_live() {
        let base = market_stub(serde_json::json!({
            "records": [{
                "commodity": "Wheat",
                "variety": "Dara",
                "market": "Karnal",
                "modal_price": "2425",
                "arrival_date": "03/11/2025"
            }]
        }))
        .await;
        let app = dashboard(WeatherConfig::default(), market_at(base));

        let (_, html) = get_page(app, "/market?state=Haryana&district=Karnal&refresh=1").await;
        assert!(html.contains("✅ Real-time market data for Karnal, Haryana"));
        assert!(html.contains("₹2425"));
        assert!(html.contains("Dara"));
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d");
        assert!(html.contains(&format!(r#"download="market_prices_Karnal_{today}.csv""#)));
        assert!(html.contains("Commodity%2CVariety%2CMarket%2CPrice%2CDate"));
        assert!(html.contains("Wheat%2CDara%2CKarnal%2C"));
    }

    #[tokio::test]
    async fn market_download_carries_shown_rows_without_second_lookup() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let base = stub::serve(Router::new().route(
            MARKET_PATH,
            get(move || {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Json(serde_json::json!({
                        "records": [{
                            "commodity": "Tomato",
                            "variety": "Hybrid",
                            "market": "Hisar",
                            "modal_price": 1650,
                            "arrival_date": "04/11/2025"
                        }]
                    }))
                }
            }),
        ))
        .await
        .unwrap();
        let app = dashboard(WeatherConfig::default(), market_at(base));

        let (_, html) = get_page(app, "/market?state=Haryana&district=Hisar&refresh=1").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(html.contains("Tomato%2CHybrid%2CHisar%2C%E2%82%B91650%2Fquintal%2C04%2F11%2F2025"));
    }

    #[tokio::test]
    async fn market_refresh_without_records_warns() {
        let base = market_stub(serde_json::json!({ "records": [] })).await;
        let app = dashboard(WeatherConfig::default(), market_at(base));

        let (_, html) = get_page(app, "/market?state=Punjab&district=Ludhiana&refresh=1").await;
        assert!(html.contains(
            "No real-time data available for Ludhiana, Punjab. Showing sample data for reference."
        ));
        assert!(html.contains("₹2200"));
    }

    #[tokio::test]
    async fn market_unknown_state_offers_ludhiana() {
        let (status, html) = get_page(offline(), "/market?state=Goa").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"<option value="Ludhiana" selected>"#));
        assert!(!html.contains("Amritsar"));
    }

    #[tokio::test]
    async fn market_export_is_csv_attachment() {
        let resp = offline()
            .oneshot(
                Request::get("/market/export?state=Punjab&district=Amritsar")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/csv")
        );
        let disposition = resp.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d");
        assert_eq!(
            disposition,
            format!("attachment; filename=\"market_prices_Amritsar_{today}.csv\"")
        );

        let csv = body_text(resp).await;
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Commodity,Variety,Market,Price,Date"));
        assert_eq!(
            lines.next(),
            Some(format!("Rice,Common,Amritsar,₹2200/quintal,{today}").as_str())
        );
    }

    // ── Weather ──

    #[tokio::test]
    async fn weather_prompt_without_city() {
        let (_, html) = get_page(offline(), "/weather").await;
        assert!(html.contains(r#"value="Amritsar""#));
        assert!(html.contains("to see current conditions"));
        assert!(!html.contains("Last Updated"));
    }

    #[tokio::test]
    async fn weather_demo_mode() {
        let (_, html) = get_page(offline(), "/weather?city=Ludhiana").await;
        assert!(html.contains("28°C"));
        assert!(html.contains("65%"));
        assert!(html.contains("Partly cloudy"));
        assert!(html.contains("Demo Mode"));
        assert!(!html.contains("Weather fetch failed"));
    }

    #[tokio::test]
    async fn weather_failure_uses_demo_fallback() {
        let app = dashboard(
            WeatherConfig {
                api_key: Some("real-key".into()),
                base_url: "http://127.0.0.1:1".into(),
                timeout: Duration::from_secs(2),
            },
            MarketConfig::default(),
        );
        let (_, html) = get_page(app, "/weather?city=Amritsar").await;
        assert!(html.contains("Weather fetch failed. Using demo data."));
        assert!(html.contains("Partly cloudy (Demo)"));
        assert!(html.contains("28°C"));
    }

    #[tokio::test]
    async fn weather_live_values() {
        let base = stub::serve(Router::new().route(
            "/data/2.5/weather",
            get(|| async {
                Json(serde_json::json!({
                    "main": { "temp": 31.5, "humidity": 40 },
                    "weather": [{ "description": "haze" }],
                    "dt": 1_700_000_000
                }))
            }),
        ))
        .await
        .unwrap();
        let app = dashboard(
            WeatherConfig {
                api_key: Some("real-key".into()),
                base_url: base,
                timeout: Duration::from_secs(2),
            },
            MarketConfig::default(),
        );
        let (_, html) = get_page(app, "/weather?city=Jaipur").await;
        assert!(html.contains("31.5°C"));
        assert!(html.contains("40%"));
        assert!(html.contains("haze"));
    }

    // ── Soil ──

    #[tokio::test]
    async fn soil_form_shows_sample_metrics() {
        let (_, html) = get_page(offline(), "/soil").await;
        assert!(html.contains("pH Level"));
        assert!(html.contains("6.2"));
        assert!(html.contains("3.5%"));
        assert!(html.contains(r#"name="soil""#));
    }

    #[tokio::test]
    async fn soil_upload_renders_table() {
        let resp = offline()
            .oneshot(soil_request("soil", b"field,ph,nitrogen\nnorth,6.8,210\nsouth,7.3\n"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("<th>nitrogen</th>"));
        assert!(html.contains("<td>north</td>"));
        assert!(html.contains("<td>7.3</td>"));
        assert!(!html.contains("Organic Matter"));
    }

    #[tokio::test]
    async fn soil_empty_upload_shows_sample_metrics() {
        let resp = offline().oneshot(soil_request("soil", b"")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("Organic Matter"));
        assert!(!html.contains("<table>"));
    }

    #[tokio::test]
    async fn soil_unreadable_csv_shows_error_and_sample_metrics() {
        let resp = offline()
            .oneshot(soil_request("soil", b"ph,depth\n\xff\xfe,10\n"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("banner error"));
        assert!(html.contains("Could not read soil CSV"));
        assert!(html.contains("Organic Matter"));
    }

    // ── Health ──

    #[tokio::test]
    async fn health_is_json() {
        let (status, body) = get_page(offline(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["weather_demo"], true);
    }
}
