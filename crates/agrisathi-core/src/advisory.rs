//! Static crop knowledge base for the advisory tab.

use serde::Serialize;

/// Fixed agronomic attributes for one crop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CropRecord {
    pub name: &'static str,
    pub soil: &'static str,
    pub season: &'static str,
    /// Seasonal water requirement, e.g. `450-650 mm`.
    pub water: &'static str,
    pub ph_range: &'static str,
    pub common_pests: &'static str,
}

/// Crops known to the advisory lookup, in selector order.
pub const CROPS: &[CropRecord] = &[
    CropRecord {
        name: "Wheat",
        soil: "Loamy",
        season: "Rabi",
        water: "450-650 mm",
        ph_range: "6.0–7.5",
        common_pests: "Stem borers, aphids",
    },
    CropRecord {
        name: "Rice",
        soil: "Clay",
        season: "Kharif",
        water: "1200–1500 mm",
        ph_range: "5.5–7.0",
        common_pests: "Brown planthopper, leaf folder",
    },
    CropRecord {
        name: "Maize",
        soil: "Sandy loam",
        season: "Kharif",
        water: "500–800 mm",
        ph_range: "5.5–7.0",
        common_pests: "Fall armyworm, stem borer",
    },
    CropRecord {
        name: "Sugarcane",
        soil: "Alluvial",
        season: "Year-round",
        water: "1500–2500 mm",
        ph_range: "6.0–7.5",
        common_pests: "Top shoot borer, scale insect",
    },
];

/// Look up a crop by its exact name.
pub fn crop(name: &str) -> Option<&'static CropRecord> {
    CROPS.iter().find(|c| c.name == name)
}

/// Crop names in selector order.
pub fn crop_names() -> impl Iterator<Item = &'static str> {
    CROPS.iter().map(|c| c.name)
}
