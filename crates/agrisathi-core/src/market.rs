//! Market price records, the per-state base-price table, and CSV export.
//!
//! The base-price table backs the synthesised fallback list shown when the
//! live Agmarknet feed is unavailable or returns nothing for a district.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// State used when the requested one is not in [`STATES`].
pub const DEFAULT_STATE: &str = "Punjab";
/// District preselected for [`DEFAULT_STATE`].
pub const DEFAULT_DISTRICT: &str = "Ludhiana";

/// CSV column headers, in export order.
pub const CSV_COLUMNS: [&str; 5] = ["Commodity", "Variety", "Market", "Price", "Date"];

/// One commodity price row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MarketPriceRecord {
    pub commodity: String,
    pub variety: String,
    pub market: String,
    /// Display string, e.g. `₹2200/quintal`.
    pub price: String,
    /// `YYYY-MM-DD`, or whatever the remote feed reports.
    pub date: String,
}

/// Where a price list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    /// Returned by the remote market feed.
    Live,
    /// Synthesised from [`STATES`] because the feed failed or was empty.
    Fallback,
}

/// Result of a market lookup, carrying an explicit provenance flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketPrices {
    pub records: Vec<MarketPriceRecord>,
    pub source: PriceSource,
}

impl MarketPrices {
    pub fn is_fallback(&self) -> bool {
        self.source == PriceSource::Fallback
    }
}

/// Static per-state reference data: base prices (₹/quintal) and selectable districts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTable {
    pub name: &'static str,
    pub rice: u32,
    pub wheat: u32,
    pub tomato: u32,
    pub potato: u32,
    pub districts: [&'static str; 5],
}

pub const STATES: &[StateTable] = &[
    StateTable {
        name: "Punjab",
        rice: 2200,
        wheat: 2100,
        tomato: 1200,
        potato: 900,
        districts: ["Ludhiana", "Amritsar", "Jalandhar", "Patiala", "Bathinda"],
    },
    StateTable {
        name: "Haryana",
        rice: 2250,
        wheat: 2150,
        tomato: 1250,
        potato: 950,
        districts: ["Karnal", "Hisar", "Faridabad", "Gurgaon", "Rohtak"],
    },
    StateTable {
        name: "Uttar Pradesh",
        rice: 2180,
        wheat: 2080,
        tomato: 1150,
        potato: 850,
        districts: ["Lucknow", "Kanpur", "Meerut", "Agra", "Varanasi"],
    },
    StateTable {
        name: "Rajasthan",
        rice: 2300,
        wheat: 2200,
        tomato: 1300,
        potato: 1000,
        districts: ["Jaipur", "Jodhpur", "Udaipur", "Kota", "Ajmer"],
    },
    StateTable {
        name: "Maharashtra",
        rice: 2400,
        wheat: 2300,
        tomato: 1400,
        potato: 1100,
        districts: ["Mumbai", "Pune", "Nagpur", "Nashik", "Aurangabad"],
    },
];

/// Look up a state's table.
pub fn state(name: &str) -> Option<&'static StateTable> {
    STATES.iter().find(|s| s.name == name)
}

/// State names in selector order.
pub fn state_names() -> impl Iterator<Item = &'static str> {
    STATES.iter().map(|s| s.name)
}

/// Districts offered for a state; unknown states only offer [`DEFAULT_DISTRICT`].
pub fn districts(state_name: &str) -> Vec<&'static str> {
    match state(state_name) {
        Some(s) => s.districts.to_vec(),
        None => vec![DEFAULT_DISTRICT],
    }
}

/// Format a numeric price as shown in the UI and CSV.
pub fn format_price(value: impl std::fmt::Display) -> String {
    format!("₹{value}/quintal")
}

/// Deterministic four-commodity price list for a location.
///
/// Prices come from the state's base table (Punjab's when the state is
/// unrecognised); every record names `district` as its market.
pub fn fallback_prices(
    state_name: &str,
    district: &str,
    date: NaiveDate,
) -> Vec<MarketPriceRecord> {
    let table = state(state_name).unwrap_or(&STATES[0]);
    let date = date.format("%Y-%m-%d").to_string();

    [
        ("Rice", "Common", table.rice),
        ("Wheat", "Common", table.wheat),
        ("Tomato", "Local", table.tomato),
        ("Potato", "Common", table.potato),
    ]
    .into_iter()
    .map(|(commodity, variety, price)| MarketPriceRecord {
        commodity: commodity.to_string(),
        variety: variety.to_string(),
        market: district.to_string(),
        price: format_price(price),
        date: date.clone(),
    })
    .collect()
}

/// Render records as CSV with the fixed [`CSV_COLUMNS`] header.
pub fn to_csv(records: &[MarketPriceRecord]) -> Result<String, CoreError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_COLUMNS)?;
    for r in records {
        wtr.write_record([&r.commodity, &r.variety, &r.market, &r.price, &r.date])?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| CoreError::Other(format!("flush csv: {e}")))?;
    Ok(String::from_utf8(bytes)?)
}

/// File name offered for a CSV download. Characters outside `[A-Za-z0-9_-]` become `_`.
pub fn export_file_name(district: &str, date: NaiveDate) -> String {
    let district: String = district
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("market_prices_{district}_{}.csv", date.format("%Y-%m-%d"))
}
