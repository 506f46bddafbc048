//! Carbon Emission Factors
//!
//! Grid electricity, fuel, and freight factors keyed by
//! `(type, region, country, subregion?)`. Transport factors are expressed
//! per ton-kilometer and identified as `transport-<mode>`.

use serde::{Deserialize, Serialize};

use super::labels_match;

fn default_true() -> bool {
    true
}

/// Country code used for factors that apply worldwide
pub const GLOBAL_COUNTRY: &str = "GLOBAL";

/// Emission factor classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorType {
    Electricity,
    Transport,
    Fuel,
    Water,
    Waste,
}

/// A single emission factor record.
///
/// ## JSON Example
///
/// ```json
/// {
///   "factorId": "transport-rail",
///   "type": "transport",
///   "region": "Global",
///   "country": "GLOBAL",
///   "factor": 0.028,
///   "unit": "kg CO2e/ton-km",
///   "source": "GLEC Framework",
///   "year": 2022
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonFactor {
    pub factor_id: String,

    #[serde(rename = "type")]
    pub factor_type: FactorType,

    pub region: String,

    /// ISO country code, or "GLOBAL"
    pub country: String,

    /// Grid subregion (e.g., eGRID "CAMX")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,

    pub factor: f64,

    /// e.g. "kg CO2e/kWh", "kg CO2e/ton-km"
    pub unit: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CarbonFactor {
    /// Create an active global transport factor
    pub fn transport(factor_id: impl Into<String>, factor: f64) -> Self {
        CarbonFactor {
            factor_id: factor_id.into(),
            factor_type: FactorType::Transport,
            region: "Global".to_string(),
            country: GLOBAL_COUNTRY.to_string(),
            subregion: None,
            factor,
            unit: "kg CO2e/ton-km".to_string(),
            source: None,
            year: None,
            is_active: true,
        }
    }

    /// Whether this factor applies to the given country code
    pub fn applies_to_country(&self, country: &str) -> bool {
        labels_match(&self.country, country)
    }

    pub fn is_global(&self) -> bool {
        self.applies_to_country(GLOBAL_COUNTRY)
    }
}
