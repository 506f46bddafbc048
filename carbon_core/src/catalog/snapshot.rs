//! # Catalog Snapshot
//!
//! The immutable, per-request view of the reference data. A snapshot is
//! built once per calculation (all four catalogs loaded concurrently) and
//! passed by reference through the resolver, converter, calculator and
//! recommender. Nothing is cached between requests.
//!
//! ## Example
//!
//! ```rust,no_run
//! use carbon_core::catalog::{CatalogSnapshot, LoadOptions};
//! use carbon_core::store::InMemoryStore;
//!
//! # async fn run() -> carbon_core::errors::CarbonResult<()> {
//! let store = InMemoryStore::seeded()?;
//! let snapshot = CatalogSnapshot::load(&store, LoadOptions::default()).await?;
//! assert!(snapshot.material_by_id("steel-rebar").is_some());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use tracing::{debug, warn};

use super::alternatives::CarbonAlternative;
use super::conversions::UnitConversion;
use super::factors::{CarbonFactor, FactorType};
use super::materials::Material;
use crate::errors::CarbonResult;
use crate::store::{FindQuery, ReferenceStore, StoreError};

/// Which optional catalogs a load should fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub include_alternatives: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            include_alternatives: true,
        }
    }
}

/// In-memory lookup structures over one consistent read of the catalogs.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    materials: Vec<Material>,
    by_id: HashMap<String, usize>,
    carbon_factors: Vec<CarbonFactor>,
    unit_conversions: Vec<UnitConversion>,
    carbon_alternatives: Vec<CarbonAlternative>,
}

impl CatalogSnapshot {
    /// Build a snapshot from already-fetched records.
    ///
    /// Materials that fail [`Material::validate`] are dropped with a warning;
    /// the first record wins when an id appears twice.
    pub fn from_parts(
        materials: Vec<Material>,
        carbon_factors: Vec<CarbonFactor>,
        unit_conversions: Vec<UnitConversion>,
        carbon_alternatives: Vec<CarbonAlternative>,
    ) -> Self {
        let materials: Vec<Material> = materials
            .into_iter()
            .filter(|m| match m.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(material_id = %m.material_id, error = %e, "skipping invalid material record");
                    false
                }
            })
            .collect();

        let mut by_id = HashMap::with_capacity(materials.len());
        for (idx, material) in materials.iter().enumerate() {
            by_id.entry(material.material_id.clone()).or_insert(idx);
        }

        CatalogSnapshot {
            materials,
            by_id,
            carbon_factors,
            unit_conversions,
            carbon_alternatives,
        }
    }

    /// Load the calculation catalogs from a store.
    ///
    /// The loads are issued concurrently and all must succeed; a failure in
    /// any one fails the whole load so a partial catalog is never used.
    pub async fn load<S>(store: &S, options: LoadOptions) -> CarbonResult<Self>
    where
        S: ReferenceStore + ?Sized,
    {
        let active = FindQuery::active();
        let all = FindQuery::all();

        let alternatives = async {
            if options.include_alternatives {
                store.find_carbon_alternatives(&active).await
            } else {
                Ok::<_, StoreError>(Vec::new())
            }
        };

        let (materials, factors, conversions, alternatives) = tokio::try_join!(
            store.find_materials(&active),
            store.find_carbon_factors(&active),
            store.find_unit_conversions(&all),
            alternatives,
        )?;

        debug!(
            materials = materials.len(),
            carbon_factors = factors.len(),
            unit_conversions = conversions.len(),
            carbon_alternatives = alternatives.len(),
            "reference catalogs loaded"
        );

        Ok(Self::from_parts(materials, factors, conversions, alternatives))
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn carbon_factors(&self) -> &[CarbonFactor] {
        &self.carbon_factors
    }

    pub fn unit_conversions(&self) -> &[UnitConversion] {
        &self.unit_conversions
    }

    pub fn carbon_alternatives(&self) -> &[CarbonAlternative] {
        &self.carbon_alternatives
    }

    /// Exact, case-sensitive id lookup over active materials
    pub fn material_by_id(&self, material_id: &str) -> Option<&Material> {
        self.by_id
            .get(material_id)
            .map(|&idx| &self.materials[idx])
            .filter(|m| m.is_active)
    }

    /// First active material of a category, in catalog order
    pub fn first_active_in_category(&self, category: &str) -> Option<&Material> {
        self.materials
            .iter()
            .find(|m| m.is_active && m.in_category(category))
    }

    /// Conversion record for a category.
    ///
    /// A record matching both category and type is preferred when a type is
    /// given; otherwise the first record for the category wins.
    pub fn conversion_record(&self, category: &str, material_type: Option<&str>) -> Option<&UnitConversion> {
        let in_category = || {
            self.unit_conversions
                .iter()
                .filter(move |c| c.matches_category(category))
        };

        material_type
            .and_then(|t| in_category().find(|c| c.matches_type(t)))
            .or_else(|| in_category().next())
    }

    /// Active transport factor by id.
    ///
    /// Precedence: the request country, then `GLOBAL`, then any country.
    pub fn transport_factor(&self, factor_id: &str, country: &str) -> Option<&CarbonFactor> {
        let candidates: Vec<&CarbonFactor> = self
            .carbon_factors
            .iter()
            .filter(|f| {
                f.is_active
                    && f.factor_type == FactorType::Transport
                    && f.factor_id.eq_ignore_ascii_case(factor_id)
            })
            .collect();

        candidates
            .iter()
            .find(|f| f.applies_to_country(country))
            .or_else(|| candidates.iter().find(|f| f.is_global()))
            .or_else(|| candidates.first())
            .copied()
    }

    /// Alternatives record for a category (first active match)
    pub fn alternatives_for(&self, category: &str) -> Option<&CarbonAlternative> {
        self.carbon_alternatives
            .iter()
            .find(|a| a.is_active && a.matches_category(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::alternatives::{AlternativeMaterial, OriginalMaterial};
    use crate::store::InMemoryStore;

    fn factor(id: &str, country: &str, value: f64) -> CarbonFactor {
        let mut f = CarbonFactor::transport(id, value);
        f.country = country.to_string();
        f
    }

    #[test]
    fn test_invalid_materials_dropped() {
        let snapshot = CatalogSnapshot::from_parts(
            vec![
                Material::new("bad", "Bad", "Concrete", -5.0, "kg CO2e/kg"),
                Material::new("good", "Good", "Concrete", 5.0, "kg CO2e/kg"),
            ],
            vec![],
            vec![],
            vec![],
        );
        assert_eq!(snapshot.materials().len(), 1);
        assert!(snapshot.material_by_id("bad").is_none());
        assert_eq!(
            snapshot.first_active_in_category("CONCRETE").unwrap().material_id,
            "good"
        );
    }

    #[test]
    fn test_duplicate_id_first_wins() {
        let snapshot = CatalogSnapshot::from_parts(
            vec![
                Material::new("dup", "First", "Steel", 1.0, "kg CO2e/kg"),
                Material::new("dup", "Second", "Steel", 2.0, "kg CO2e/kg"),
            ],
            vec![],
            vec![],
            vec![],
        );
        assert_eq!(snapshot.material_by_id("dup").unwrap().name, "First");
    }

    #[test]
    fn test_transport_factor_precedence() {
        let snapshot = CatalogSnapshot::from_parts(
            vec![],
            vec![
                factor("transport-truck", "DE", 0.2),
                factor("transport-truck", "GLOBAL", 0.105),
                factor("transport-truck", "US", 0.09),
            ],
            vec![],
            vec![],
        );
        assert_eq!(snapshot.transport_factor("transport-truck", "us").unwrap().factor, 0.09);
        assert_eq!(snapshot.transport_factor("transport-truck", "FR").unwrap().factor, 0.105);
        assert!(snapshot.transport_factor("transport-rail", "US").is_none());

        let no_global = CatalogSnapshot::from_parts(vec![], vec![factor("transport-rail", "DE", 0.03)], vec![], vec![]);
        assert_eq!(no_global.transport_factor("transport-rail", "US").unwrap().factor, 0.03);
    }

    #[test]
    fn test_conversion_record_prefers_type() {
        let snapshot = CatalogSnapshot::from_parts(
            vec![],
            vec![],
            vec![
                UnitConversion::new("Concrete").with_density(2400.0),
                UnitConversion::new("Concrete").with_type("Lightweight").with_density(1800.0),
            ],
            vec![],
        );
        assert_eq!(snapshot.conversion_record("concrete", None).unwrap().density, Some(2400.0));
        assert_eq!(
            snapshot.conversion_record("concrete", Some("lightweight")).unwrap().density,
            Some(1800.0)
        );
        assert_eq!(
            snapshot.conversion_record("concrete", Some("Precast")).unwrap().density,
            Some(2400.0)
        );
    }

    #[tokio::test]
    async fn test_load_skips_alternatives_when_not_requested() {
        let store = InMemoryStore::new().with_alternative(CarbonAlternative::new(
            OriginalMaterial {
                category: "Steel".to_string(),
                name: "Virgin Steel".to_string(),
                gwp: 2.1,
                unit: "kg CO2e/kg".to_string(),
            },
            vec![AlternativeMaterial::new("Recycled Steel", 0.8, "kg CO2e/kg", 62.0)],
        ));

        let with = CatalogSnapshot::load(&store, LoadOptions::default()).await.unwrap();
        assert!(with.alternatives_for("steel").is_some());

        let without = CatalogSnapshot::load(
            &store,
            LoadOptions {
                include_alternatives: false,
            },
        )
        .await
        .unwrap();
        assert!(without.alternatives_for("steel").is_none());
    }

    #[tokio::test]
    async fn test_load_seeded() {
        let store = InMemoryStore::seeded().unwrap();
        let snapshot = CatalogSnapshot::load(&store, LoadOptions::default()).await.unwrap();
        assert!(snapshot.material_by_id("steel-rebar").is_some());
        assert!(snapshot.transport_factor("transport-truck", "US").is_some());
    }
}
