//! # Reference Catalogs
//!
//! Record types for the five reference catalogs the engine reads, the
//! built-in reference dataset, the on-disk bundle format, and the
//! per-request [`CatalogSnapshot`].
//!
//! ## Catalogs
//!
//! - [`Material`] - canonical material records with GWP and lifecycle stages
//! - [`CarbonFactor`] - emission factors (transport per ton-km, grid, fuel)
//! - [`UnitConversion`] - per-category densities and explicit unit factors
//! - [`CarbonAlternative`] - curated lower-carbon substitutes per category
//! - [`EpdProgram`] - EPD program operators (labeling only)

pub mod alternatives;
pub mod builtin;
pub mod bundle;
pub mod conversions;
pub mod epd;
pub mod factors;
pub mod materials;
pub mod snapshot;

pub use alternatives::{
    AlternativeMaterial, Availability, CarbonAlternative, Compatibility, CostImpact, OriginalMaterial,
};
pub use builtin::builtin_catalog;
pub use bundle::{BundleMeta, CatalogBundle, SCHEMA_VERSION};
pub use conversions::{ConversionEntry, DensityRange, UnitConversion};
pub use epd::{identify_epd_number, validate_epd_number, EpdProgram};
pub use factors::{CarbonFactor, FactorType, GLOBAL_COUNTRY};
pub use materials::{BenchmarkStats, DataQuality, LifecycleStages, Material};
pub use snapshot::{CatalogSnapshot, LoadOptions};

/// Case-insensitive comparison of catalog labels (categories, types, countries)
pub(crate) fn labels_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
