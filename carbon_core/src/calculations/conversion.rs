//! # Unit Conversion Resolver
//!
//! Reconciles the unit a caller declared against a material's native unit.
//! Lookups run against the category's [`UnitConversion`] record; the first
//! rule that applies wins:
//!
//! 1. Direct entry `from -> to`
//! 2. Reversed entry `to -> from`, using `1 / factor`
//! 3. Density, for exactly `m³ -> kg` (`density`) or `kg -> m³` (`1 / density`)
//!
//! When nothing applies the calculator carries on with the unconverted
//! quantity and flags the item.
//!
//! ## Example
//!
//! ```rust
//! use carbon_core::calculations::conversion::{find_conversion, ConversionMethod};
//! use carbon_core::catalog::{ConversionEntry, UnitConversion};
//!
//! let concrete = UnitConversion::new("Concrete")
//!     .with_density(2400.0)
//!     .with_entry(ConversionEntry::new("yd³", "m³", 0.7646));
//!
//! let step = find_conversion(Some(&concrete), "m³", "yd³").unwrap();
//! assert_eq!(step.method, ConversionMethod::Reversed);
//! assert!((step.factor - 1.0 / 0.7646).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{CatalogSnapshot, UnitConversion};
use crate::errors::{CarbonError, CarbonResult};
use crate::units::{is_cubic_meters, is_kilograms, round_to, units_match};

/// Decimal places used when a converted quantity is displayed
pub const DISPLAY_PLACES: u32 = 4;

/// How a conversion factor was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMethod {
    /// Units already match; factor 1
    Identity,
    Direct,
    Reversed,
    Density,
}

/// A factor and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionStep {
    pub factor: f64,
    pub method: ConversionMethod,
    pub notes: Option<String>,
}

/// Find the factor that turns `from` into `to` using one category record.
///
/// Returns `None` when the record is missing or no rule applies. Matching
/// units are not handled here; see [`resolve_conversion`].
pub fn find_conversion(record: Option<&UnitConversion>, from: &str, to: &str) -> Option<ConversionStep> {
    let record = record?;

    if let Some(entry) = record.direct(from, to) {
        return Some(ConversionStep {
            factor: entry.factor,
            method: ConversionMethod::Direct,
            notes: entry.notes.clone(),
        });
    }

    if let Some(entry) = record.reverse(from, to).filter(|e| e.factor != 0.0) {
        return Some(ConversionStep {
            factor: 1.0 / entry.factor,
            method: ConversionMethod::Reversed,
            notes: Some(match &entry.notes {
                Some(notes) => format!("Reversed from {} -> {} ({})", entry.from_unit, entry.to_unit, notes),
                None => format!("Reversed from {} -> {}", entry.from_unit, entry.to_unit),
            }),
        });
    }

    let density = record.density.filter(|d| d.is_finite() && *d > 0.0)?;
    if is_cubic_meters(from) && is_kilograms(to) {
        Some(ConversionStep {
            factor: density,
            method: ConversionMethod::Density,
            notes: Some(format!("Density {} kg/m³", density)),
        })
    } else if is_kilograms(from) && is_cubic_meters(to) {
        Some(ConversionStep {
            factor: 1.0 / density,
            method: ConversionMethod::Density,
            notes: Some(format!("Density {} kg/m³", density)),
        })
    } else {
        None
    }
}

/// What happened to a line item's quantity
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    /// Declared unit already is the native unit
    NotRequired,
    /// Quantity expressed in the native unit, unrounded
    Converted {
        quantity: f64,
        unit: String,
        step: ConversionStep,
    },
    /// No rule applied; the declared quantity is used as-is
    Unavailable,
}

/// Status tag reported per line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConversionStatus {
    NotRequired,
    Converted,
    Unavailable,
}

impl ConversionOutcome {
    pub fn status(&self) -> ConversionStatus {
        match self {
            ConversionOutcome::NotRequired => ConversionStatus::NotRequired,
            ConversionOutcome::Converted { .. } => ConversionStatus::Converted,
            ConversionOutcome::Unavailable => ConversionStatus::Unavailable,
        }
    }

    /// Working quantity and unit: converted if possible, otherwise the declared ones
    pub fn working<'a>(&'a self, quantity: f64, unit: &'a str) -> (f64, &'a str) {
        match self {
            ConversionOutcome::Converted { quantity, unit, .. } => (*quantity, unit.as_str()),
            _ => (quantity, unit),
        }
    }
}

/// Convert a line item's quantity into the material's native unit.
pub fn resolve_conversion(
    snapshot: &CatalogSnapshot,
    category: &str,
    material_type: Option<&str>,
    quantity: f64,
    from: &str,
    to: &str,
) -> ConversionOutcome {
    if units_match(from, to) {
        return ConversionOutcome::NotRequired;
    }

    match find_conversion(snapshot.conversion_record(category, material_type), from, to) {
        Some(step) => ConversionOutcome::Converted {
            quantity: quantity * step.factor,
            unit: to.to_string(),
            step,
        },
        None => {
            warn!(category, from, to, "no unit conversion found; using declared quantity");
            ConversionOutcome::Unavailable
        }
    }
}

/// Standalone conversion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub quantity: f64,
    pub from_unit: String,
    pub to_unit: String,
    pub material_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_type: Option<String>,
}

/// Standalone conversion result.
///
/// ## JSON Example
///
/// ```json
/// {
///   "quantity": 1.0,
///   "fromUnit": "kg",
///   "toUnit": "m³",
///   "materialCategory": "Concrete",
///   "convertedQuantity": 0.0004,
///   "factor": 0.000416666,
///   "method": "density",
///   "notes": "Density 2400 kg/m³"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub quantity: f64,
    pub from_unit: String,
    pub to_unit: String,
    pub material_category: String,
    /// Rounded to [`DISPLAY_PLACES`]
    pub converted_quantity: f64,
    pub factor: f64,
    pub method: ConversionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ConversionRequest {
    pub fn validate(&self) -> CarbonResult<()> {
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(CarbonError::invalid_input(
                "quantity",
                self.quantity.to_string(),
                "Quantity must be positive",
            ));
        }
        for (field, value) in [
            ("fromUnit", &self.from_unit),
            ("toUnit", &self.to_unit),
            ("materialCategory", &self.material_category),
        ] {
            if value.trim().is_empty() {
                return Err(CarbonError::missing_field(field));
            }
        }
        Ok(())
    }
}

/// Convert a quantity between units for a material category.
///
/// Unlike the line-item path, a missing conversion is an error here.
pub fn convert_units(snapshot: &CatalogSnapshot, request: &ConversionRequest) -> CarbonResult<ConversionResult> {
    request.validate()?;

    let step = if units_match(&request.from_unit, &request.to_unit) {
        ConversionStep {
            factor: 1.0,
            method: ConversionMethod::Identity,
            notes: None,
        }
    } else {
        let record = snapshot.conversion_record(&request.material_category, request.material_type.as_deref());
        find_conversion(record, &request.from_unit, &request.to_unit).ok_or_else(|| {
            CarbonError::not_found(
                "Unit conversion",
                format!(
                    "{} -> {} for {}",
                    request.from_unit, request.to_unit, request.material_category
                ),
            )
        })?
    };

    Ok(ConversionResult {
        quantity: request.quantity,
        from_unit: request.from_unit.clone(),
        to_unit: request.to_unit.clone(),
        material_category: request.material_category.clone(),
        converted_quantity: round_to(request.quantity * step.factor, DISPLAY_PLACES),
        factor: step.factor,
        method: step.method,
        notes: step.notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ConversionEntry;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn concrete() -> UnitConversion {
        UnitConversion::new("Concrete")
            .with_density(2400.0)
            .with_entry(ConversionEntry::new("yd³", "m³", 0.7646))
            .with_entry(ConversionEntry::new("ton", "kg", 1000.0))
    }

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::from_parts(vec![], vec![], vec![concrete()], vec![])
    }

    fn request(quantity: f64, from: &str, to: &str) -> ConversionRequest {
        ConversionRequest {
            quantity,
            from_unit: from.to_string(),
            to_unit: to.to_string(),
            material_category: "Concrete".to_string(),
            material_type: None,
        }
    }

    #[test]
    fn test_direct_wins() {
        let step = find_conversion(Some(&concrete()), "YD³", "m3").unwrap();
        assert_eq!(step.method, ConversionMethod::Direct);
        assert_eq!(step.factor, 0.7646);
    }

    #[test]
    fn test_reverse_is_reciprocal() {
        let step = find_conversion(Some(&concrete()), "kg", "ton").unwrap();
        assert_eq!(step.method, ConversionMethod::Reversed);
        assert!(approx_eq(step.factor, 1.0 / 1000.0));
        assert!(step.notes.unwrap().starts_with("Reversed"));
    }

    #[test]
    fn test_density_factor() {
        let to_mass = find_conversion(Some(&concrete()), "m³", "kg").unwrap();
        assert_eq!(to_mass.method, ConversionMethod::Density);
        assert_eq!(to_mass.factor, 2400.0);

        let to_volume = find_conversion(Some(&concrete()), "kg", "m³").unwrap();
        assert!(approx_eq(to_volume.factor, 1.0 / 2400.0));
    }

    #[test]
    fn test_density_round_trip() {
        let snap = snapshot();
        let mass = convert_units(&snap, &request(1.0, "m³", "kg")).unwrap();
        let back = convert_units(&snap, &request(mass.converted_quantity, "kg", "m³")).unwrap();
        assert!(approx_eq(back.converted_quantity, 1.0));
    }

    #[test]
    fn test_density_only_for_mass_volume() {
        assert!(find_conversion(Some(&concrete()), "m²", "kg").is_none());
        assert!(find_conversion(Some(&UnitConversion::new("Carpet")), "m³", "kg").is_none());
        assert!(find_conversion(None, "m³", "kg").is_none());
    }

    #[test]
    fn test_resolve_outcomes() {
        let snap = snapshot();
        assert_eq!(
            resolve_conversion(&snap, "Concrete", None, 5.0, "M3", "m³"),
            ConversionOutcome::NotRequired
        );

        let outcome = resolve_conversion(&snap, "concrete", None, 2.0, "m³", "kg");
        assert_eq!(outcome.status(), ConversionStatus::Converted);
        assert_eq!(outcome.working(2.0, "m³"), (4800.0, "kg"));

        let missing = resolve_conversion(&snap, "Steel", None, 2.0, "m³", "kg");
        assert_eq!(missing, ConversionOutcome::Unavailable);
        assert_eq!(missing.working(2.0, "m³"), (2.0, "m³"));
    }

    #[test]
    fn test_convert_units_rounds_for_display() {
        let result = convert_units(&snapshot(), &request(1.0, "kg", "m³")).unwrap();
        assert_eq!(result.converted_quantity, 0.0004);
        assert!(approx_eq(result.factor, 1.0 / 2400.0));
    }

    #[test]
    fn test_convert_units_errors() {
        let snap = snapshot();
        assert_eq!(
            convert_units(&snap, &request(1.0, "m²", "kg")).unwrap_err().error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            convert_units(&snap, &request(0.0, "m³", "kg")).unwrap_err().error_code(),
            "INVALID_INPUT"
        );
        let identity = convert_units(&snap, &request(3.0, "kg", "KG")).unwrap();
        assert_eq!(identity.method, ConversionMethod::Identity);
        assert_eq!(identity.converted_quantity, 3.0);
    }
}
