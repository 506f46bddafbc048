//! # Unit Types
//!
//! Type-safe wrappers for the quantities the engine computes with, plus the
//! string helpers used to compare the free-form unit labels found in
//! reference data ("m³", "M3", "kg CO2e/m³").
//!
//! ## Design Philosophy
//!
//! Carbon arithmetic uses a small, fixed set of units, so simple newtype
//! wrappers are enough:
//! - JSON serialization stays clean (just numbers)
//! - Mixing up tonnes and kilograms in the transport path is a type error
//! - Minimal runtime overhead
//!
//! ## Units
//!
//! - Mass: kilograms (kg), metric tonnes (t = 1000 kg)
//! - Distance: kilometers (km)
//! - Emissions: kilograms of CO2-equivalent (kg CO2e)
//!
//! ## Example
//!
//! ```rust
//! use carbon_core::units::{Kilograms, Tonnes, KgCo2e};
//!
//! let cargo = Kilograms(500.0);
//! let tonnes: Tonnes = cargo.into();
//! assert_eq!(tonnes.0, 0.5);
//!
//! let total = KgCo2e(10.0) + KgCo2e(0.5);
//! assert_eq!(total.value(), 10.5);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Sub};

/// Display label for every emissions figure the engine reports
pub const KG_CO2E: &str = "kg CO2e";

/// Native unit assumed when a GWP unit string carries no denominator
pub const DEFAULT_NATIVE_UNIT: &str = "kg";

// ============================================================================
// Mass Units
// ============================================================================

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

/// Mass in metric tonnes (1 t = 1000 kg)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tonnes(pub f64);

impl From<Kilograms> for Tonnes {
    fn from(kg: Kilograms) -> Self {
        Tonnes(kg.0 / 1000.0)
    }
}

impl From<Tonnes> for Kilograms {
    fn from(t: Tonnes) -> Self {
        Kilograms(t.0 * 1000.0)
    }
}

// ============================================================================
// Distance Units
// ============================================================================

/// Distance in kilometers
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilometers(pub f64);

// ============================================================================
// Emission Units
// ============================================================================

/// Emissions in kilograms of CO2-equivalent
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KgCo2e(pub f64);

impl KgCo2e {
    /// Round for presentation (2 decimal places)
    pub fn rounded(self) -> f64 {
        round_to(self.0, 2)
    }
}

impl AddAssign for KgCo2e {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::iter::Sum for KgCo2e {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(KgCo2e(0.0), |acc, x| acc + x)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Kilograms);
impl_arithmetic!(Tonnes);
impl_arithmetic!(Kilometers);
impl_arithmetic!(KgCo2e);

// ============================================================================
// Unit Labels
// ============================================================================

/// Canonical form of a unit label for comparison.
///
/// Trims, lowercases, and folds the ASCII spellings `m3`/`m2` onto `m³`/`m²`
/// so that "M3" and "m³" compare equal.
pub fn normalize_unit(unit: &str) -> String {
    let lowered = unit.trim().to_lowercase();
    match lowered.as_str() {
        "m3" | "cu m" | "cubic meter" | "cubic metre" => "m³".to_string(),
        "m2" | "sq m" | "square meter" | "square metre" => "m²".to_string(),
        _ => lowered,
    }
}

/// Case-insensitive unit label equality
pub fn units_match(a: &str, b: &str) -> bool {
    normalize_unit(a) == normalize_unit(b)
}

/// Whether a label names kilograms
pub fn is_kilograms(unit: &str) -> bool {
    normalize_unit(unit) == "kg"
}

/// Whether a label names cubic meters
pub fn is_cubic_meters(unit: &str) -> bool {
    normalize_unit(unit) == "m³"
}

/// Native unit encoded in a GWP unit string.
///
/// `"kg CO2e/m³"` yields `"m³"`. Strings without a denominator fall back to
/// kilograms.
pub fn native_unit_from_gwp_unit(gwp_unit: &str) -> String {
    gwp_unit
        .split('/')
        .nth(1)
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(DEFAULT_NATIVE_UNIT)
        .to_string()
}

// ============================================================================
// Rounding
// ============================================================================

/// Round half-up to a fixed number of decimal places.
///
/// Halves round toward positive infinity (`-2.5` becomes `-2`), which keeps
/// reported figures identical to the figures the marketplace already
/// publishes.
pub fn round_to(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale + 0.5).floor() / scale
}

/// Round half-up to an integer percentage
pub fn round_percent(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
