//! File-backed reference store.
//!
//! Serves the catalogs of a `.carbon.json` bundle. The file is re-read on
//! every call so a snapshot always reflects what is on disk; reads happen on
//! the blocking pool and take a shared lock.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{FindQuery, ReferenceStore, StoreError};
use crate::catalog::{CarbonAlternative, CarbonFactor, CatalogBundle, EpdProgram, Material, UnitConversion};
use crate::errors::CarbonError;
use crate::file_io::load_catalog_bundle;

#[derive(Debug, Clone)]
pub struct BundleStore {
    path: PathBuf,
}

impl BundleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        BundleStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self, catalog: &str) -> Result<CatalogBundle, StoreError> {
        let path = self.path.clone();
        let loaded = tokio::task::spawn_blocking(move || load_catalog_bundle(&path))
            .await
            .map_err(|e| StoreError::unavailable(catalog, e.to_string()))?;

        loaded.map_err(|e| match e {
            CarbonError::SerializationError { .. } | CarbonError::VersionMismatch { .. } => {
                StoreError::malformed(catalog, e.to_string())
            }
            other => StoreError::unavailable(catalog, other.to_string()),
        })
    }
}

#[async_trait]
impl ReferenceStore for BundleStore {
    async fn find_materials(&self, query: &FindQuery) -> Result<Vec<Material>, StoreError> {
        let bundle = self.read("materials").await?;
        Ok(bundle
            .materials
            .into_iter()
            .filter(|m| query.admits(m.is_active))
            .collect())
    }

    async fn find_carbon_factors(&self, query: &FindQuery) -> Result<Vec<CarbonFactor>, StoreError> {
        let bundle = self.read("carbonFactors").await?;
        Ok(bundle
            .carbon_factors
            .into_iter()
            .filter(|f| query.admits(f.is_active))
            .collect())
    }

    async fn find_unit_conversions(&self, _query: &FindQuery) -> Result<Vec<UnitConversion>, StoreError> {
        Ok(self.read("unitConversions").await?.unit_conversions)
    }

    async fn find_carbon_alternatives(
        &self,
        query: &FindQuery,
    ) -> Result<Vec<CarbonAlternative>, StoreError> {
        let bundle = self.read("carbonAlternatives").await?;
        Ok(bundle
            .carbon_alternatives
            .into_iter()
            .filter(|a| query.admits(a.is_active))
            .collect())
    }

    async fn find_epd_programs(&self, query: &FindQuery) -> Result<Vec<EpdProgram>, StoreError> {
        let bundle = self.read("epdPrograms").await?;
        Ok(bundle
            .epd_programs
            .into_iter()
            .filter(|p| query.admits(p.is_active))
            .collect())
    }
}
