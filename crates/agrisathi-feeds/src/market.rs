//! Commodity prices from the Agmarknet resource on data.gov.in.
//!
//! Lookups never fail: network errors, bad statuses, malformed bodies and
//! empty result sets all fall back to the synthesised list from
//! [`agrisathi_core::fallback_prices`], flagged as [`PriceSource::Fallback`].

use std::time::Duration;

use agrisathi_core::market::format_price;
use agrisathi_core::{MarketPriceRecord, MarketPrices, PriceSource, fallback_prices};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::FeedError;

/// Agmarknet daily mandi prices resource.
pub const RESOURCE_ID: &str = "9ef84268-d588-465a-a308-a864a43d0070";
/// Public sample key published by data.gov.in.
pub const PUBLIC_API_KEY: &str = "579b464db66ec23bdd000001b4a05ae55d8942be40e70dc2943c0e59";

const MISSING: &str = "N/A";

#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub api_key: String,
    pub base_url: String,
    /// Maximum number of records requested per lookup.
    pub limit: u32,
    pub timeout: Duration,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            api_key: PUBLIC_API_KEY.to_string(),
            base_url: "https://api.data.gov.in".to_string(),
            limit: 10,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Price lookup by state and district.
pub struct MarketClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    limit: u32,
}

#[derive(Deserialize)]
struct ResourceResponse {
    #[serde(default)]
    records: Vec<RawRecord>,
}

#[derive(Deserialize)]
struct RawRecord {
    commodity: Option<Value>,
    variety: Option<Value>,
    market: Option<Value>,
    modal_price: Option<Value>,
    arrival_date: Option<Value>,
}

impl From<RawRecord> for MarketPriceRecord {
    fn from(r: RawRecord) -> Self {
        Self {
            commodity: text(r.commodity),
            variety: text(r.variety),
            market: text(r.market),
            price: format_price(text(r.modal_price)),
            date: text(r.arrival_date),
        }
    }
}

impl MarketClient {
    pub fn new(config: MarketConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            limit: config.limit,
        })
    }

    /// Prices for a district, live when available, synthesised otherwise.
    pub async fn prices(&self, state: &str, district: &str) -> MarketPrices {
        match self.fetch(state, district).await {
            Ok(records) if !records.is_empty() => MarketPrices {
                records,
                source: PriceSource::Live,
            },
            Ok(_) => {
                info!(state, district, "no live market records, using fallback prices");
                Self::fallback(state, district)
            }
            Err(e) => {
                warn!(state, district, error = %e, "market lookup failed, using fallback prices");
                Self::fallback(state, district)
            }
        }
    }

    /// Synthesised price list for a location, dated today.
    pub fn fallback(state: &str, district: &str) -> MarketPrices {
        let today = chrono::Local::now().date_naive();
        MarketPrices {
            records: fallback_prices(state, district, today),
            source: PriceSource::Fallback,
        }
    }

    async fn fetch(
        &self,
        state: &str,
        district: &str,
    ) -> Result<Vec<MarketPriceRecord>, FeedError> {
        let url = format!("{}/resource/{RESOURCE_ID}", self.base_url);
        let limit = self.limit.to_string();

        info!(url = %url, state, district, "fetching market prices");
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("api-key", self.api_key.as_str()),
                ("format", "json"),
                ("filters[state]", state),
                ("filters[district]", district),
                ("limit", limit.as_str()),
            ])
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
        let parsed: ResourceResponse = serde_json::from_str(&body)?;
        info!(count = parsed.records.len(), "fetched market records");
        Ok(parsed.records.into_iter().map(Into::into).collect())
    }
}

/// Render a loosely-typed JSON field as display text.
fn text(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => MISSING.to_string(),
        Some(other) => other.to_string(),
    }
}
