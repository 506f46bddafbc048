//! # Engine Settings
//!
//! Defaults the engine applies when a request leaves something out. Settings
//! serialize to a small JSON document; every field is optional on disk and
//! falls back to [`EngineSettings::default`].
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "defaultRegion": "Europe",
//!   "defaultCountry": "DE",
//!   "fallbackTransportFactor": 0.105,
//!   "maxAlternatives": 3
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CarbonError, CarbonResult};

/// kg CO2e per ton-km applied when no transport factor record matches
/// (road freight average)
pub const DEFAULT_TRANSPORT_FACTOR: f64 = 0.105;

/// Alternatives reported per line item
pub const DEFAULT_MAX_ALTERNATIVES: usize = 3;

/// Version label stamped into response metadata
pub const DEFAULT_DATA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Region echoed in reports when the request omits one
    pub default_region: String,

    /// Country code used for factor lookup when the request omits one
    pub default_country: String,

    /// kg CO2e per ton-km
    pub fallback_transport_factor: f64,

    pub max_alternatives: usize,

    pub data_version: String,

    /// Applied when a request omits `includeAlternatives`
    pub include_alternatives: bool,

    /// Applied when a request omits `includeBenchmarks`
    pub include_benchmarks: bool,

    /// Applied when a request omits `includeProjectAnalysis`
    pub include_project_analysis: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            default_region: "North America".to_string(),
            default_country: "US".to_string(),
            fallback_transport_factor: DEFAULT_TRANSPORT_FACTOR,
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            data_version: DEFAULT_DATA_VERSION.to_string(),
            include_alternatives: true,
            include_benchmarks: true,
            include_project_analysis: true,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> CarbonResult<()> {
        let factor = self.fallback_transport_factor;
        if !factor.is_finite() || factor < 0.0 {
            return Err(CarbonError::invalid_input(
                "fallbackTransportFactor",
                factor.to_string(),
                "Transport factor must be a non-negative number",
            ));
        }
        if self.default_country.trim().is_empty() {
            return Err(CarbonError::missing_field("defaultCountry"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: EngineSettings = serde_json::from_str(r#"{ "defaultCountry": "DE" }"#).unwrap();
        assert_eq!(settings.default_country, "DE");
        assert_eq!(settings.default_region, "North America");
        assert_eq!(settings.fallback_transport_factor, 0.105);
        assert_eq!(settings.max_alternatives, 3);
        assert!(settings.include_benchmarks);
        assert!(settings.include_project_analysis);
    }

    #[test]
    fn test_validate() {
        assert!(EngineSettings::default().validate().is_ok());

        let negative = EngineSettings {
            fallback_transport_factor: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let blank = EngineSettings {
            default_country: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(blank.validate().unwrap_err().error_code(), "MISSING_FIELD");
    }
}
