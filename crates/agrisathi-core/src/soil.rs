//! Soil test uploads, rendered as-is without schema validation.

use serde::Serialize;

use crate::CoreError;

/// Sample metrics shown when no soil test has been uploaded.
pub const SAMPLE_METRICS: &[(&str, &str)] = &[("pH Level", "6.2"), ("Organic Matter", "3.5%")];

/// Tabular contents of an uploaded CSV file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SoilTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SoilTable {
    /// Parse CSV bytes. The first record is the header; rows may be ragged.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        tracing::debug!(rows = rows.len(), "parsed soil csv");
        Ok(Self { headers, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }
}
