//! Current-conditions snapshot rendered by the weather tab.

use serde::{Deserialize, Serialize};

/// Current weather at a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    pub description: String,
    /// Observation time as `YYYY-MM-DD HH:MM`, or `Demo Mode`.
    pub timestamp: String,
}

impl WeatherSnapshot {
    /// Fixed snapshot served when no weather API key is configured.
    pub fn demo() -> Self {
        Self {
            temperature: 28.0,
            humidity: 65.0,
            description: "Partly cloudy".to_string(),
            timestamp: "Demo Mode".to_string(),
        }
    }

    /// Snapshot the dashboard substitutes after a failed live lookup.
    pub fn demo_fallback() -> Self {
        Self {
            description: "Partly cloudy (Demo)".to_string(),
            ..Self::demo()
        }
    }

    pub fn temperature_display(&self) -> String {
        format!("{}°C", self.temperature)
    }

    pub fn humidity_display(&self) -> String {
        format!("{}%", self.humidity)
    }
}
