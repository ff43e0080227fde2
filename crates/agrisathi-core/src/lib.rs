//! AgriSathi domain types and static tables.
//!
//! Classification results, the crop advisory table, market price records
//! with the per-state fallback table, weather snapshots and soil uploads.
//! No I/O beyond CSV encoding and parsing.

pub mod advisory;
pub mod classification;
mod error;
pub mod market;
pub mod soil;
pub mod weather;

pub use advisory::{CropRecord, crop, crop_names};
pub use classification::Classification;
pub use error::CoreError;
pub use market::{MarketPriceRecord, MarketPrices, PriceSource, fallback_prices};
pub use soil::SoilTable;
pub use weather::WeatherSnapshot;
