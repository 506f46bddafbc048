//! # Embodied Carbon Calculator
//!
//! Lifecycle-stage carbon (EN 15804 modules A1-A5) for a quantity of a
//! resolved material, plus optional transport-leg emissions.
//!
//! ## Formulas
//!
//! ```text
//! a1a3  = (stages.a1a3 or gwp) × quantity
//! a4    = (stages.a4 or 0) × quantity
//! a5    = (stages.a5 or 0) × quantity
//! total = a1a3 + a4 + a5
//!
//! transport = factor (kg CO2e/ton-km) × distance (km) × weight (t)
//! ```
//!
//! All values are carried unrounded; rounding happens when a report is built.
//!
//! ## Example
//!
//! ```rust
//! use carbon_core::calculations::embodied::lifecycle_carbon;
//! use carbon_core::catalog::Material;
//!
//! let concrete = Material::new("c", "Concrete", "Concrete", 100.0, "kg CO2e/kg");
//! let carbon = lifecycle_carbon(&concrete, 10.0);
//! assert_eq!(carbon.a1a3.value(), 1000.0);
//! assert_eq!(carbon.total().value(), 1000.0);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{CatalogSnapshot, Material};
use crate::errors::CarbonError;
use crate::units::{is_kilograms, KgCo2e, Kilograms, Kilometers, Tonnes};

/// Freight mode for a transport leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Truck,
    Rail,
    Ship,
    Air,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Truck => "truck",
            TransportMode::Rail => "rail",
            TransportMode::Ship => "ship",
            TransportMode::Air => "air",
        }
    }

    /// Id of the carbon factor record for this mode
    pub fn factor_id(&self) -> &'static str {
        match self {
            TransportMode::Truck => "transport-truck",
            TransportMode::Rail => "transport-rail",
            TransportMode::Ship => "transport-ship",
            TransportMode::Air => "transport-air",
        }
    }
}

impl FromStr for TransportMode {
    type Err = CarbonError;

    /// Accepts the modal aliases `road`, `sea` and `ocean`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "truck" | "road" => Ok(TransportMode::Truck),
            "rail" => Ok(TransportMode::Rail),
            "ship" | "sea" | "ocean" => Ok(TransportMode::Ship),
            "air" => Ok(TransportMode::Air),
            _ => Err(CarbonError::unknown_transport_mode(s)),
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrounded A1-A5 carbon for one line item
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LifecycleCarbon {
    pub a1a3: KgCo2e,
    pub a4: KgCo2e,
    pub a5: KgCo2e,
}

impl LifecycleCarbon {
    pub fn total(&self) -> KgCo2e {
        self.a1a3 + self.a4 + self.a5
    }
}

/// Embodied carbon of `quantity` native units of `material`
pub fn lifecycle_carbon(material: &Material, quantity: f64) -> LifecycleCarbon {
    LifecycleCarbon {
        a1a3: KgCo2e(material.a1a3_factor() * quantity),
        a4: KgCo2e(material.a4_factor() * quantity),
        a5: KgCo2e(material.a5_factor() * quantity),
    }
}

/// Shipped weight of a working quantity.
///
/// A kilogram quantity with a known density goes through
/// `quantity / density × density / 1000`; every other quantity is taken to
/// be kilograms. This is a known approximation, not a volume-to-mass
/// conversion.
pub fn shipped_weight(quantity: f64, working_unit: &str, density: Option<f64>) -> Tonnes {
    match density.filter(|d| *d > 0.0) {
        Some(density) if is_kilograms(working_unit) => Kilograms(quantity / density * density).into(),
        _ => Kilograms(quantity).into(),
    }
}

/// A transport leg as given on a line item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportLeg {
    pub mode: TransportMode,
    pub distance: Kilometers,
}

/// Where the transport factor came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorSource {
    Catalog,
    Default,
}

/// Unrounded transport emissions for one leg
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportCarbon {
    pub leg: TransportLeg,
    /// kg CO2e per ton-km
    pub factor: f64,
    pub factor_source: FactorSource,
    pub weight: Tonnes,
    pub emissions: KgCo2e,
}

/// Emissions for moving `quantity` of `material` over `leg`.
///
/// The factor is looked up by mode and country; `fallback_factor` applies
/// when no active record matches.
pub fn transport_carbon(
    snapshot: &CatalogSnapshot,
    leg: TransportLeg,
    material: &Material,
    quantity: f64,
    working_unit: &str,
    country: &str,
    fallback_factor: f64,
) -> TransportCarbon {
    let (factor, factor_source) = match snapshot.transport_factor(leg.mode.factor_id(), country) {
        Some(record) => (record.factor, FactorSource::Catalog),
        None => {
            warn!(
                mode = %leg.mode,
                country,
                fallback_factor,
                "no transport factor record; using default"
            );
            (fallback_factor, FactorSource::Default)
        }
    };

    let weight = shipped_weight(quantity, working_unit, material.density);
    TransportCarbon {
        leg,
        factor,
        factor_source,
        weight,
        emissions: KgCo2e(factor * leg.distance.value() * weight.value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CarbonFactor, LifecycleStages};
    use crate::settings::DEFAULT_TRANSPORT_FACTOR;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_a1a3_defaults_to_gwp_exactly() {
        let mat = Material::new("x", "X", "Steel", 1.37, "kg CO2e/kg");
        let carbon = lifecycle_carbon(&mat, 123.0);
        assert_eq!(carbon.a1a3.value(), 1.37 * 123.0);
        assert_eq!(carbon.a4.value(), 0.0);
        assert_eq!(carbon.a5.value(), 0.0);
    }

    #[test]
    fn test_total_is_sum_of_stages() {
        let mat = Material::new("c", "Concrete", "Concrete", 350.0, "kg CO2e/m³").with_stages(
            LifecycleStages {
                a1a3: Some(320.0),
                a4: Some(15.0),
                a5: Some(5.0),
                ..Default::default()
            },
        );
        let carbon = lifecycle_carbon(&mat, 2.5);
        assert_eq!(carbon.a1a3.value(), 800.0);
        assert_eq!(carbon.a4.value(), 37.5);
        assert_eq!(carbon.a5.value(), 12.5);
        assert_eq!(
            carbon.total().value(),
            carbon.a1a3.value() + carbon.a4.value() + carbon.a5.value()
        );
    }

    #[test]
    fn test_mode_aliases() {
        assert_eq!("Road".parse::<TransportMode>().unwrap(), TransportMode::Truck);
        assert_eq!("ocean".parse::<TransportMode>().unwrap(), TransportMode::Ship);
        assert_eq!(" SEA ".parse::<TransportMode>().unwrap(), TransportMode::Ship);
        assert_eq!("rail".parse::<TransportMode>().unwrap().factor_id(), "transport-rail");
        let err = "teleport".parse::<TransportMode>().unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_TRANSPORT_MODE");
    }

    #[test]
    fn test_shipped_weight() {
        assert!(approx_eq(shipped_weight(500.0, "kg", None).value(), 0.5));
        // non-mass unit: taken as kilograms
        assert!(approx_eq(shipped_weight(2.0, "m³", Some(2400.0)).value(), 0.002));
    }

    #[test]
    fn test_shipped_weight_kg_with_density_is_not_scaled() {
        assert!(approx_eq(shipped_weight(10_000.0, "KG", Some(7850.0)).value(), 10.0));

        let snapshot = CatalogSnapshot::default();
        let steel = Material::new("steel-rebar", "Rebar", "Steel", 1.2, "kg CO2e/kg").with_density(7850.0);
        let leg = TransportLeg {
            mode: TransportMode::Truck,
            distance: Kilometers(100.0),
        };
        let result = transport_carbon(&snapshot, leg, &steel, 10_000.0, "kg", "US", DEFAULT_TRANSPORT_FACTOR);
        assert!(approx_eq(result.weight.value(), 10.0));
        assert!(approx_eq(result.emissions.value(), 105.0));
    }

    #[test]
    fn test_truck_default_factor() {
        let snapshot = CatalogSnapshot::default();
        let mat = Material::new("x", "X", "Steel", 1.0, "kg CO2e/kg");
        let leg = TransportLeg {
            mode: TransportMode::Truck,
            distance: Kilometers(200.0),
        };
        let result = transport_carbon(&snapshot, leg, &mat, 500.0, "kg", "US", DEFAULT_TRANSPORT_FACTOR);
        assert_eq!(result.factor_source, FactorSource::Default);
        assert!(approx_eq(result.weight.value(), 0.5));
        assert!(approx_eq(result.emissions.value(), 10.5));
    }

    #[test]
    fn test_catalog_factor_used() {
        let snapshot = CatalogSnapshot::from_parts(
            vec![],
            vec![CarbonFactor::transport("transport-rail", 0.028)],
            vec![],
            vec![],
        );
        let mat = Material::new("x", "X", "Steel", 1.0, "kg CO2e/kg");
        let leg = TransportLeg {
            mode: TransportMode::Rail,
            distance: Kilometers(1000.0),
        };
        let result = transport_carbon(&snapshot, leg, &mat, 2000.0, "kg", "US", DEFAULT_TRANSPORT_FACTOR);
        assert_eq!(result.factor_source, FactorSource::Catalog);
        assert!(approx_eq(result.emissions.value(), 56.0));
    }
}
