//! # Catalog Bundles
//!
//! A `CatalogBundle` is an offline export of all five reference catalogs.
//! Bundles serialize to `.carbon.json` files as human-readable JSON and are
//! the on-disk format behind [`crate::store::BundleStore`].
//!
//! ## Structure
//!
//! ```text
//! CatalogBundle
//! ├── meta: BundleMeta (schema version, data version, export timestamp)
//! ├── materials: Vec<Material>
//! ├── carbonFactors: Vec<CarbonFactor>
//! ├── unitConversions: Vec<UnitConversion>
//! ├── carbonAlternatives: Vec<CarbonAlternative>
//! └── epdPrograms: Vec<EpdProgram>
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::alternatives::CarbonAlternative;
use super::conversions::UnitConversion;
use super::epd::EpdProgram;
use super::factors::CarbonFactor;
use super::materials::Material;

/// Current schema version for catalog bundle files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Bundle header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMeta {
    /// Schema version (for migration compatibility)
    pub schema_version: String,

    /// Version label of the reference data itself (e.g., "1.0.0")
    pub data_version: String,

    /// Where the data came from (e.g., "EC3 Database")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// When the bundle was exported
    pub exported_at: DateTime<Utc>,
}

/// All reference catalogs in one serializable container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBundle {
    pub meta: BundleMeta,

    #[serde(default)]
    pub materials: Vec<Material>,

    #[serde(default)]
    pub carbon_factors: Vec<CarbonFactor>,

    #[serde(default)]
    pub unit_conversions: Vec<UnitConversion>,

    #[serde(default)]
    pub carbon_alternatives: Vec<CarbonAlternative>,

    #[serde(default)]
    pub epd_programs: Vec<EpdProgram>,
}

impl CatalogBundle {
    /// Create an empty bundle stamped with the current time.
    pub fn new(data_version: impl Into<String>) -> Self {
        CatalogBundle {
            meta: BundleMeta {
                schema_version: SCHEMA_VERSION.to_string(),
                data_version: data_version.into(),
                source: None,
                exported_at: Utc::now(),
            },
            materials: Vec::new(),
            carbon_factors: Vec::new(),
            unit_conversions: Vec::new(),
            carbon_alternatives: Vec::new(),
            epd_programs: Vec::new(),
        }
    }

    /// Update the export timestamp.
    pub fn touch(&mut self) {
        self.meta.exported_at = Utc::now();
    }

    /// Total number of records across all catalogs
    pub fn record_count(&self) -> usize {
        self.materials.len()
            + self.carbon_factors.len()
            + self.unit_conversions.len()
            + self.carbon_alternatives.len()
            + self.epd_programs.len()
    }
}

impl Default for CatalogBundle {
    fn default() -> Self {
        CatalogBundle::new("0.0.0")
    }
}
