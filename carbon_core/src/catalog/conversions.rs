//! Unit Conversion Tables
//!
//! Per-category conversion records. Each holds an optional density and a
//! list of explicit one-directional factors; the inverse direction is not
//! guaranteed to be present (see [`crate::conversion`] for how the resolver
//! fills the gap).

use serde::{Deserialize, Serialize};

use super::labels_match;
use super::materials::DataQuality;
use crate::units::units_match;

/// Plausible density range for a category (kg/m³)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityRange {
    pub min: f64,
    pub max: f64,
}

/// One explicit conversion: 1 `from_unit` equals `factor` `to_unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionEntry {
    pub from_unit: String,
    pub to_unit: String,
    pub factor: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ConversionEntry {
    pub fn new(from_unit: impl Into<String>, to_unit: impl Into<String>, factor: f64) -> Self {
        ConversionEntry {
            from_unit: from_unit.into(),
            to_unit: to_unit.into(),
            factor,
            notes: None,
        }
    }

    /// Whether this entry converts `from` into `to` as stored
    pub fn converts(&self, from: &str, to: &str) -> bool {
        units_match(&self.from_unit, from) && units_match(&self.to_unit, to)
    }
}

/// Conversion record keyed by `(material_category, material_type?)`.
///
/// ## JSON Example
///
/// ```json
/// {
///   "materialCategory": "Concrete",
///   "materialType": "Ready-mix",
///   "density": 2400,
///   "conversions": [
///     { "fromUnit": "m³", "toUnit": "kg", "factor": 2400, "notes": "Standard density" },
///     { "fromUnit": "yd³", "toUnit": "kg", "factor": 1835 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitConversion {
    pub material_category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_type: Option<String>,

    /// kg/m³
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density_range: Option<DensityRange>,

    #[serde(default)]
    pub conversions: Vec<ConversionEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality: Option<DataQuality>,
}

impl UnitConversion {
    pub fn new(material_category: impl Into<String>) -> Self {
        UnitConversion {
            material_category: material_category.into(),
            material_type: None,
            density: None,
            density_range: None,
            conversions: Vec::new(),
            source: None,
            data_quality: None,
        }
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = Some(density);
        self
    }

    pub fn with_type(mut self, material_type: impl Into<String>) -> Self {
        self.material_type = Some(material_type.into());
        self
    }

    pub fn with_entry(mut self, entry: ConversionEntry) -> Self {
        self.conversions.push(entry);
        self
    }

    pub fn matches_category(&self, category: &str) -> bool {
        labels_match(&self.material_category, category)
    }

    pub fn matches_type(&self, material_type: &str) -> bool {
        self.material_type
            .as_deref()
            .map(|t| labels_match(t, material_type))
            .unwrap_or(false)
    }

    /// First entry stored exactly as `from -> to`
    pub fn direct(&self, from: &str, to: &str) -> Option<&ConversionEntry> {
        self.conversions.iter().find(|c| c.converts(from, to))
    }

    /// First entry stored as `to -> from`
    pub fn reverse(&self, from: &str, to: &str) -> Option<&ConversionEntry> {
        self.conversions.iter().find(|c| c.converts(to, from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concrete() -> UnitConversion {
        UnitConversion::new("Concrete")
            .with_type("Ready-mix")
            .with_density(2400.0)
            .with_entry(ConversionEntry::new("m³", "yd³", 1.308))
            .with_entry(ConversionEntry::new("yd³", "kg", 1835.0))
    }

    #[test]
    fn test_direct_and_reverse_lookup() {
        let rec = concrete();
        assert_eq!(rec.direct("YD³", "kg").map(|c| c.factor), Some(1835.0));
        assert!(rec.direct("kg", "yd³").is_none());
        assert_eq!(rec.reverse("kg", "yd³").map(|c| c.factor), Some(1835.0));
        assert_eq!(rec.direct("m3", "yd³").map(|c| c.factor), Some(1.308));
    }

    #[test]
    fn test_key_matching() {
        let rec = concrete();
        assert!(rec.matches_category("concrete "));
        assert!(rec.matches_type("ready-MIX"));
        assert!(!UnitConversion::new("Cement").matches_type("Portland"));
    }
}
