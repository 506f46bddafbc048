//! # Material Resolver
//!
//! Maps a loose material reference onto exactly one canonical [`Material`].
//! Resolution runs an ordered list of strategies; the first strategy that
//! produces a match wins and the rest are skipped.
//!
//! 1. [`Strategy::ById`] - exact `materialId`
//! 2. [`Strategy::ByCategory`] - first active material of the category
//!    (case-insensitive)
//! 3. [`Strategy::ByName`] - the material name contains the query, or the
//!    query contains the material name (case-insensitive)
//!
//! A strategy only runs when its key is present, so a request carrying an
//! unknown id still falls through to its category and name.
//!
//! A miss is not an error: the caller receives [`Resolution::Unresolved`]
//! carrying the original query.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{CatalogSnapshot, Material};

/// Loose material reference from a line item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl MaterialQuery {
    pub fn by_id(material_id: impl Into<String>) -> Self {
        MaterialQuery {
            material_id: Some(material_id.into()),
            ..Default::default()
        }
    }

    pub fn by_category(category: impl Into<String>) -> Self {
        MaterialQuery {
            category: Some(category.into()),
            ..Default::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        MaterialQuery {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn material_id(&self) -> Option<&str> {
        non_blank(&self.material_id)
    }

    pub fn category(&self) -> Option<&str> {
        non_blank(&self.category)
    }

    pub fn name(&self) -> Option<&str> {
        non_blank(&self.name)
    }

    /// True when no strategy has anything to work with
    pub fn is_empty(&self) -> bool {
        self.material_id().is_none() && self.category().is_none() && self.name().is_none()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// One way of matching a query against the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ById,
    ByCategory,
    ByName,
}

impl Strategy {
    /// Strategies in the order they are tried
    pub const ORDER: [Strategy; 3] = [Strategy::ById, Strategy::ByCategory, Strategy::ByName];

    pub fn apply<'a>(&self, snapshot: &'a CatalogSnapshot, query: &MaterialQuery) -> Option<&'a Material> {
        match self {
            Strategy::ById => snapshot.material_by_id(query.material_id()?),
            Strategy::ByCategory => snapshot.first_active_in_category(query.category()?),
            Strategy::ByName => {
                let needle = query.name()?.to_lowercase();
                snapshot.materials().iter().find(|m| {
                    let name = m.name.trim().to_lowercase();
                    m.is_active && !name.is_empty() && (name.contains(&needle) || needle.contains(&name))
                })
            }
        }
    }
}

/// Outcome of resolving one line item
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Resolved(&'a Material),
    Unresolved(MaterialQuery),
}

impl<'a> Resolution<'a> {
    pub fn material(&self) -> Option<&'a Material> {
        match self {
            Resolution::Resolved(m) => Some(*m),
            Resolution::Unresolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// Resolve a query against a snapshot.
pub fn resolve_material<'a>(snapshot: &'a CatalogSnapshot, query: &MaterialQuery) -> Resolution<'a> {
    if query.is_empty() {
        warn!("line item carries no material id, category or name");
        return Resolution::Unresolved(query.clone());
    }
    for strategy in Strategy::ORDER {
        if let Some(material) = strategy.apply(snapshot, query) {
            debug!(?strategy, material_id = %material.material_id, "material resolved");
            return Resolution::Resolved(material);
        }
    }
    warn!(?query, "material not found in catalog");
    Resolution::Unresolved(query.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CatalogSnapshot {
        let mut retired = Material::new("concrete-old", "Old Mix", "Concrete", 500.0, "kg CO2e/m³");
        retired.is_active = false;
        CatalogSnapshot::from_parts(
            vec![
                retired,
                Material::new("concrete-std", "Ready-Mix Concrete", "Concrete", 350.0, "kg CO2e/m³"),
                Material::new("concrete-lc", "Low Carbon Concrete", "Concrete", 250.0, "kg CO2e/m³"),
                Material::new("steel-rebar", "Reinforcing Steel (Rebar)", "Steel", 1.2, "kg CO2e/kg"),
            ],
            vec![],
            vec![],
            vec![],
        )
    }

    #[test]
    fn test_resolve_by_id() {
        let snap = snapshot();
        let res = resolve_material(&snap, &MaterialQuery::by_id("concrete-lc"));
        assert_eq!(res.material().unwrap().material_id, "concrete-lc");
    }

    #[test]
    fn test_resolve_by_category_skips_inactive() {
        let snap = snapshot();
        let res = resolve_material(&snap, &MaterialQuery::by_category("CONCRETE"));
        assert_eq!(res.material().unwrap().material_id, "concrete-std");
    }

    #[test]
    fn test_resolve_by_name_both_directions() {
        let snap = snapshot();
        let res = resolve_material(&snap, &MaterialQuery::by_name("rebar"));
        assert_eq!(res.material().unwrap().material_id, "steel-rebar");

        let res = resolve_material(&snap, &MaterialQuery::by_name("Premium Low Carbon Concrete mix"));
        assert_eq!(res.material().unwrap().material_id, "concrete-lc");
    }

    #[test]
    fn test_id_takes_precedence_over_category() {
        let snap = snapshot();
        let query = MaterialQuery {
            material_id: Some("steel-rebar".to_string()),
            category: Some("Concrete".to_string()),
            name: None,
        };
        assert_eq!(resolve_material(&snap, &query).material().unwrap().material_id, "steel-rebar");
    }

    #[test]
    fn test_unknown_id_falls_through() {
        let snap = snapshot();
        let query = MaterialQuery {
            material_id: Some("nope".to_string()),
            category: Some("Steel".to_string()),
            name: None,
        };
        assert_eq!(resolve_material(&snap, &query).material().unwrap().material_id, "steel-rebar");
    }

    #[test]
    fn test_miss_is_unresolved() {
        let snap = snapshot();
        let query = MaterialQuery::by_name("Unobtainium");
        match resolve_material(&snap, &query) {
            Resolution::Unresolved(q) => assert_eq!(q, query),
            other => panic!("expected miss, got {:?}", other),
        }

        let blank = MaterialQuery {
            material_id: Some("  ".to_string()),
            category: Some(String::new()),
            name: None,
        };
        assert!(blank.is_empty());
        assert!(!resolve_material(&snap, &blank).is_resolved());
    }
}
