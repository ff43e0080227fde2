//! Current weather from OpenWeatherMap.

use std::time::Duration;

use agrisathi_core::WeatherSnapshot;
use chrono::{DateTime, TimeZone};
use serde::Deserialize;
use tracing::{info, warn};

use crate::FeedError;

/// Key value that means "no key configured".
pub const DEMO_KEY: &str = "DEMO_KEY";

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key; `None`, empty, or [`DEMO_KEY`] selects demo mode.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Current-conditions lookup by city name.
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct CurrentWeather {
    main: MainReadings,
    weather: Vec<Condition>,
    dt: i64,
}

#[derive(Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: f64,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty() && k != DEMO_KEY);
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// True when no usable API key is configured.
    pub fn is_demo(&self) -> bool {
        self.api_key.is_none()
    }

    /// Current conditions for `city`.
    ///
    /// In demo mode this always returns [`WeatherSnapshot::demo`] without a
    /// network call. Otherwise any failure (network, timeout, non-success
    /// status, malformed body) yields `None`.
    pub async fn current(&self, city: &str) -> Option<WeatherSnapshot> {
        let Some(key) = self.api_key.as_deref() else {
            return Some(WeatherSnapshot::demo());
        };

        match self.fetch(city, key).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(city, error = %e, "weather lookup failed");
                None
            }
        }
    }

    async fn fetch(&self, city: &str, key: &str) -> Result<WeatherSnapshot, FeedError> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        info!(url = %url, city, "fetching current weather");
        let resp = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", key), ("units", "metric")])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FeedError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let parsed: CurrentWeather = serde_json::from_str(&body)?;
        let description = parsed
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| FeedError::Malformed("empty weather array".into()))?;
        let timestamp = format_observed(parsed.dt, &chrono::Local)
            .ok_or_else(|| FeedError::Malformed(format!("timestamp out of range: {}", parsed.dt)))?;

        Ok(WeatherSnapshot {
            temperature: parsed.main.temp,
            humidity: parsed.main.humidity,
            description,
            timestamp,
        })
    }
}

/// Format a unix timestamp as `YYYY-MM-DD HH:MM` in `tz`.
fn format_observed<Tz: TimeZone>(unix_secs: i64, tz: &Tz) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let utc = DateTime::from_timestamp(unix_secs, 0)?;
    Some(utc.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string())
}
