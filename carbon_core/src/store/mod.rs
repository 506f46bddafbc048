//! # Reference Data Store
//!
//! The engine reads reference data through the [`ReferenceStore`] trait: a
//! document-store boundary with one `find_*` method per catalog. The engine
//! never writes through it.
//!
//! ## Implementations
//!
//! - [`InMemoryStore`] - vectors held in memory; `InMemoryStore::seeded()`
//!   serves the built-in reference catalog
//! - [`BundleStore`] - reads a `.carbon.json` catalog bundle from disk
//!
//! ## Thread Safety
//!
//! Implementations must be `Send + Sync` so a single store can be shared
//! across concurrent requests; each request still takes its own
//! [`crate::catalog::CatalogSnapshot`].

pub mod bundle;
pub mod memory;

pub use bundle::BundleStore;
pub use memory::InMemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::{CarbonAlternative, CarbonFactor, EpdProgram, Material, UnitConversion};
use crate::errors::CarbonError;

/// Errors a store backend reports.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backend could not be reached or read
    #[error("{catalog} store unavailable: {reason}")]
    Unavailable { catalog: String, reason: String },

    /// Records were read but could not be decoded
    #[error("{catalog} records are malformed: {reason}")]
    Malformed { catalog: String, reason: String },
}

impl StoreError {
    pub fn unavailable(catalog: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Unavailable {
            catalog: catalog.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(catalog: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Malformed {
            catalog: catalog.into(),
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for CarbonError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable { catalog, reason } | StoreError::Malformed { catalog, reason } => {
                CarbonError::reference_data_unavailable(catalog, reason)
            }
        }
    }
}

/// Filter applied to a `find_*` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FindQuery {
    /// Only return records whose `isActive` flag is set
    pub active_only: bool,
}

impl FindQuery {
    /// Every record, active or not
    pub fn all() -> Self {
        FindQuery { active_only: false }
    }

    /// Active records only
    pub fn active() -> Self {
        FindQuery { active_only: true }
    }

    /// Whether a record with the given active flag passes this filter
    pub fn admits(&self, is_active: bool) -> bool {
        !self.active_only || is_active
    }
}

/// Read-only access to the reference catalogs.
///
/// Unit conversions carry no active flag; stores return every record for
/// them regardless of the query.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn find_materials(&self, query: &FindQuery) -> Result<Vec<Material>, StoreError>;

    async fn find_carbon_factors(&self, query: &FindQuery) -> Result<Vec<CarbonFactor>, StoreError>;

    async fn find_unit_conversions(&self, query: &FindQuery) -> Result<Vec<UnitConversion>, StoreError>;

    async fn find_carbon_alternatives(&self, query: &FindQuery)
        -> Result<Vec<CarbonAlternative>, StoreError>;

    async fn find_epd_programs(&self, query: &FindQuery) -> Result<Vec<EpdProgram>, StoreError>;
}
