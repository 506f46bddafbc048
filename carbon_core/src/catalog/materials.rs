//! Material Reference Records
//!
//! A [`Material`] is the canonical record the resolver maps every line item
//! onto. Records are produced by the ingestion job and are read-only here.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "materialId": "concrete-ready-mix-standard",
//!   "name": "Ready-Mix Concrete (Standard)",
//!   "category": "Concrete",
//!   "subcategory": "Ready-Mix",
//!   "gwp": 350,
//!   "gwpUnit": "kg CO2e/m³",
//!   "declaredUnit": "1 m³",
//!   "density": 2400,
//!   "lifecycleStages": { "a1a3": 350, "a4": 15, "a5": 5 },
//!   "benchmarks": { "percentile": 50, "industryAvg": 350, "bestInClass": 150, "worstInClass": 500 },
//!   "dataQuality": "high"
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::labels_match;
use crate::errors::{CarbonError, CarbonResult};
use crate::units::native_unit_from_gwp_unit;

fn default_true() -> bool {
    true
}

/// Data quality tag attached to a reference record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    High,
    Medium,
    Low,
    #[default]
    Estimated,
}

/// GWP per declared unit, broken down by EN 15804 lifecycle stage.
///
/// Every stage is optional. Only A1-A5 feed the embodied total; B, C and D
/// are carried for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleStages {
    /// Product stage: raw material supply, transport, manufacturing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a1a3: Option<f64>,
    /// Transport to site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a4: Option<f64>,
    /// Construction / installation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a5: Option<f64>,
    /// Use stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b1b7: Option<f64>,
    /// End of life
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c1c4: Option<f64>,
    /// Benefits and loads beyond the system boundary (usually a credit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<f64>,
}

/// Industry statistics for a material's GWP
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkStats {
    /// Percentile of this material within its category (lower is better)
    pub percentile: f64,
    /// Industry average GWP, same unit as the material
    pub industry_avg: f64,
    /// Best-in-class GWP
    pub best_in_class: f64,
    /// Worst-in-class GWP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worst_in_class: Option<f64>,
}

/// Canonical material reference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Stable identifier (e.g., "steel-rebar")
    pub material_id: String,

    /// Display name
    pub name: String,

    /// Classification category (e.g., "Concrete")
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,

    /// CSI MasterFormat section (e.g., "03 30 00")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_format: Option<String>,

    /// Global warming potential per declared unit
    pub gwp: f64,

    /// Unit of `gwp`, e.g. "kg CO2e/kg"
    pub gwp_unit: String,

    /// Declared unit text, e.g. "1 m³"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_unit: Option<String>,

    /// Density in kg/m³ for mass-volume conversion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_stages: Option<LifecycleStages>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmarks: Option<BenchmarkStats>,

    #[serde(default)]
    pub data_quality: DataQuality,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// EPD registration number, if the figure comes from a published EPD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epd_number: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Material {
    /// Create an active material with only the required fields set.
    ///
    /// # Example
    ///
    /// ```rust
    /// use carbon_core::catalog::Material;
    ///
    /// let mat = Material::new("steel-rebar", "Reinforcing Steel", "Steel", 1.2, "kg CO2e/kg")
    ///     .with_density(7850.0);
    /// assert_eq!(mat.native_unit(), "kg");
    /// ```
    pub fn new(
        material_id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        gwp: f64,
        gwp_unit: impl Into<String>,
    ) -> Self {
        Material {
            material_id: material_id.into(),
            name: name.into(),
            category: category.into(),
            subcategory: None,
            master_format: None,
            gwp,
            gwp_unit: gwp_unit.into(),
            declared_unit: None,
            density: None,
            lifecycle_stages: None,
            benchmarks: None,
            data_quality: DataQuality::default(),
            source: None,
            region: None,
            tags: Vec::new(),
            epd_number: None,
            is_active: true,
        }
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = Some(density);
        self
    }

    pub fn with_stages(mut self, stages: LifecycleStages) -> Self {
        self.lifecycle_stages = Some(stages);
        self
    }

    pub fn with_benchmarks(mut self, benchmarks: BenchmarkStats) -> Self {
        self.benchmarks = Some(benchmarks);
        self
    }

    /// Unit the GWP figure is normalized against (denominator of `gwp_unit`)
    pub fn native_unit(&self) -> String {
        native_unit_from_gwp_unit(&self.gwp_unit)
    }

    /// A1-A3 factor per native unit, falling back to the headline GWP
    pub fn a1a3_factor(&self) -> f64 {
        self.lifecycle_stages
            .and_then(|s| s.a1a3)
            .unwrap_or(self.gwp)
    }

    /// A4 factor per native unit (0 when not declared)
    pub fn a4_factor(&self) -> f64 {
        self.lifecycle_stages.and_then(|s| s.a4).unwrap_or(0.0)
    }

    /// A5 factor per native unit (0 when not declared)
    pub fn a5_factor(&self) -> f64 {
        self.lifecycle_stages.and_then(|s| s.a5).unwrap_or(0.0)
    }

    /// Case-insensitive category comparison
    pub fn in_category(&self, category: &str) -> bool {
        labels_match(&self.category, category)
    }

    /// Check the record's numeric invariants.
    ///
    /// GWP, density and stages A through C must be non-negative and finite.
    /// Stage D is a credit and may be negative.
    pub fn validate(&self) -> CarbonResult<()> {
        if self.material_id.trim().is_empty() {
            return Err(CarbonError::missing_field("materialId"));
        }
        check_non_negative(&self.material_id, "gwp", Some(self.gwp))?;
        check_non_negative(&self.material_id, "density", self.density)?;
        if let Some(density) = self.density {
            if density == 0.0 {
                return Err(CarbonError::invalid_input(
                    format!("{}.density", self.material_id),
                    "0",
                    "Density must be positive when present",
                ));
            }
        }
        if let Some(stages) = &self.lifecycle_stages {
            check_non_negative(&self.material_id, "a1a3", stages.a1a3)?;
            check_non_negative(&self.material_id, "a4", stages.a4)?;
            check_non_negative(&self.material_id, "a5", stages.a5)?;
            check_non_negative(&self.material_id, "b1b7", stages.b1b7)?;
            check_non_negative(&self.material_id, "c1c4", stages.c1c4)?;
        }
        Ok(())
    }
}

fn check_non_negative(material_id: &str, field: &str, value: Option<f64>) -> CarbonResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(CarbonError::invalid_input(
            format!("{}.{}", material_id, field),
            v.to_string(),
            "Value must be a non-negative number",
        )),
        _ => Ok(()),
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} {})", self.name, self.gwp, self.gwp_unit)
    }
}
