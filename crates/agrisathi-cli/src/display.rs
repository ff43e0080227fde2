//! Plain-text cards for terminal output.

use std::fmt::Write;
use std::path::Path;

use agrisathi_core::{Classification, CropRecord};

/// Crop advisory as a vertical card.
pub fn crop_card(crop: &CropRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", crop.name);
    for (label, value) in [
        ("Soil", crop.soil),
        ("Season", crop.season),
        ("Water requirement", crop.water),
        ("pH Range", crop.ph_range),
        ("Common Pests", crop.common_pests),
    ] {
        let _ = writeln!(out, "  {label:<20} {value}");
    }
    out
}

/// One-line classification result.
pub fn classification(image: &Path, result: &Classification) -> String {
    format!(
        "{}: {} ({:.1}%)",
        image.display(),
        result.label,
        result.confidence * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_card_lists_attributes() {
        let card = crop_card(agrisathi_core::crop("Maize").unwrap());
        let lines: Vec<_> = card.lines().collect();
        assert_eq!(lines[0], "=== Maize ===");
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("  Soil"));
        assert!(lines[1].ends_with("Sandy loam"));
        assert!(lines[5].ends_with("Fall armyworm, stem borer"));
    }

    #[test]
    fn classification_line() {
        let result = Classification {
            label: "Tomato___Late_blight".into(),
            confidence: 0.875,
        };
        assert_eq!(
            classification(Path::new("leaf.jpg"), &result),
            "leaf.jpg: Tomato___Late_blight (87.5%)"
        );
    }
}
