//! Low-Carbon Alternative Records
//!
//! Curated swap recommendations keyed by the original material's category.
//! The order of `alternatives` is the curators' priority order and is never
//! re-sorted.

use serde::{Deserialize, Serialize};

use super::labels_match;

fn default_true() -> bool {
    true
}

/// How directly an alternative can replace the original
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compatibility {
    DropIn,
    Similar,
    RequiresRedesign,
}

/// Expected cost relative to the original
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CostImpact {
    Lower,
    Similar,
    Higher,
    MuchHigher,
}

/// Market availability of an alternative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    WidelyAvailable,
    Limited,
    Emerging,
}

/// Snapshot of the material the alternatives are measured against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalMaterial {
    pub category: String,
    pub name: String,
    pub gwp: f64,
    pub unit: String,
}

/// One substitute material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeMaterial {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    pub gwp: f64,

    pub unit: String,

    /// Percentage reduction vs. `OriginalMaterial::gwp`, as curated
    pub reduction: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduction_absolute: Option<f64>,

    pub compatibility: Compatibility,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub considerations: Vec<String>,

    pub cost_impact: CostImpact,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_multiplier: Option<f64>,

    pub availability: Availability,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<String>,
}

impl AlternativeMaterial {
    pub fn new(name: impl Into<String>, gwp: f64, unit: impl Into<String>, reduction: f64) -> Self {
        AlternativeMaterial {
            name: name.into(),
            category: None,
            gwp,
            unit: unit.into(),
            reduction,
            reduction_absolute: None,
            compatibility: Compatibility::Similar,
            considerations: Vec::new(),
            cost_impact: CostImpact::Similar,
            cost_multiplier: None,
            availability: Availability::WidelyAvailable,
            regions: Vec::new(),
        }
    }
}

/// Alternatives for one original material category.
///
/// ## JSON Example
///
/// ```json
/// {
///   "originalMaterial": { "category": "Steel", "name": "Virgin Structural Steel", "gwp": 2.1, "unit": "kg CO2e/kg" },
///   "alternatives": [
///     { "name": "Recycled Steel (EAF)", "gwp": 0.8, "unit": "kg CO2e/kg", "reduction": 62,
///       "compatibility": "drop-in", "costImpact": "similar", "availability": "widely-available" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonAlternative {
    pub original_material: OriginalMaterial,

    pub alternatives: Vec<AlternativeMaterial>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CarbonAlternative {
    pub fn new(original_material: OriginalMaterial, alternatives: Vec<AlternativeMaterial>) -> Self {
        CarbonAlternative {
            original_material,
            alternatives,
            applications: Vec::new(),
            data_quality: None,
            is_active: true,
        }
    }

    pub fn matches_category(&self, category: &str) -> bool {
        labels_match(&self.original_material.category, category)
    }
}
