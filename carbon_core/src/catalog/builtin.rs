//! Built-in Reference Catalog
//!
//! Industry-average reference data (EC3/Autodesk averages, eGRID, GLEC)
//! compiled into the binary so the engine works without a data store. The
//! JSON is parsed once on first use.

use once_cell::sync::Lazy;

use super::bundle::CatalogBundle;
use crate::errors::{CarbonError, CarbonResult};

const BUILTIN_JSON: &str = include_str!("../../data/reference_catalog.json");

static BUILTIN: Lazy<CarbonResult<CatalogBundle>> =
    Lazy::new(|| serde_json::from_str(BUILTIN_JSON).map_err(CarbonError::from));

/// The built-in catalog bundle.
///
/// # Example
///
/// ```rust
/// let bundle = carbon_core::catalog::builtin_catalog().unwrap();
/// assert!(bundle.materials.iter().any(|m| m.category == "Concrete"));
/// ```
pub fn builtin_catalog() -> CarbonResult<&'static CatalogBundle> {
    BUILTIN.as_ref().map_err(Clone::clone)
}
