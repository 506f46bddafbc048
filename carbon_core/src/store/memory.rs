//! In-memory reference store.

use async_trait::async_trait;

use super::{FindQuery, ReferenceStore, StoreError};
use crate::catalog::{
    builtin_catalog, CarbonAlternative, CarbonFactor, CatalogBundle, EpdProgram, Material,
    UnitConversion,
};
use crate::errors::CarbonResult;

/// A store backed by plain vectors.
///
/// Useful for tests and for serving the built-in catalog. Records are
/// returned in insertion order, which the resolver treats as catalog order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub materials: Vec<Material>,
    pub carbon_factors: Vec<CarbonFactor>,
    pub unit_conversions: Vec<UnitConversion>,
    pub carbon_alternatives: Vec<CarbonAlternative>,
    pub epd_programs: Vec<EpdProgram>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the built-in reference catalog
    pub fn seeded() -> CarbonResult<Self> {
        Ok(Self::from_bundle(builtin_catalog()?.clone()))
    }

    pub fn from_bundle(bundle: CatalogBundle) -> Self {
        InMemoryStore {
            materials: bundle.materials,
            carbon_factors: bundle.carbon_factors,
            unit_conversions: bundle.unit_conversions,
            carbon_alternatives: bundle.carbon_alternatives,
            epd_programs: bundle.epd_programs,
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.materials.push(material);
        self
    }

    pub fn with_factor(mut self, factor: CarbonFactor) -> Self {
        self.carbon_factors.push(factor);
        self
    }

    pub fn with_conversion(mut self, conversion: UnitConversion) -> Self {
        self.unit_conversions.push(conversion);
        self
    }

    pub fn with_alternative(mut self, alternative: CarbonAlternative) -> Self {
        self.carbon_alternatives.push(alternative);
        self
    }
}

#[async_trait]
impl ReferenceStore for InMemoryStore {
    async fn find_materials(&self, query: &FindQuery) -> Result<Vec<Material>, StoreError> {
        Ok(self
            .materials
            .iter()
            .filter(|m| query.admits(m.is_active))
            .cloned()
            .collect())
    }

    async fn find_carbon_factors(&self, query: &FindQuery) -> Result<Vec<CarbonFactor>, StoreError> {
        Ok(self
            .carbon_factors
            .iter()
            .filter(|f| query.admits(f.is_active))
            .cloned()
            .collect())
    }

    async fn find_unit_conversions(&self, _query: &FindQuery) -> Result<Vec<UnitConversion>, StoreError> {
        Ok(self.unit_conversions.clone())
    }

    async fn find_carbon_alternatives(
        &self,
        query: &FindQuery,
    ) -> Result<Vec<CarbonAlternative>, StoreError> {
        Ok(self
            .carbon_alternatives
            .iter()
            .filter(|a| query.admits(a.is_active))
            .cloned()
            .collect())
    }

    async fn find_epd_programs(&self, query: &FindQuery) -> Result<Vec<EpdProgram>, StoreError> {
        Ok(self
            .epd_programs
            .iter()
            .filter(|p| query.admits(p.is_active))
            .cloned()
            .collect())
    }
}
