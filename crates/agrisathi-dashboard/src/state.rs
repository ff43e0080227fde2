//! Dashboard state: outbound feed clients and compiled templates.

use std::sync::Arc;
use std::time::Instant;

use agrisathi_feeds::{MarketClient, MarketConfig, WeatherClient, WeatherConfig};

use crate::DashboardError;
use crate::render::Templates;

#[derive(Clone, Debug, Default)]
pub struct DashboardConfig {
    pub weather: WeatherConfig,
    pub market: MarketConfig,
}

pub struct AppState {
    pub weather: WeatherClient,
    pub market: MarketClient,
    pub templates: Templates,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Result<Self, DashboardError> {
        Ok(Self {
            weather: WeatherClient::new(config.weather)?,
            market: MarketClient::new(config.market)?,
            templates: Templates::new()?,
            started_at: Instant::now(),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;
