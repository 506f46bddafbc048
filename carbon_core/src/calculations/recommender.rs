//! # Alternative Recommender
//!
//! Suggests curated lower-carbon substitutes for a resolved material and
//! projects the savings for the line item's quantity.
//!
//! Savings use the resolved material's own GWP, not the GWP stored on the
//! alternatives record, and the working (converted) quantity:
//!
//! ```text
//! potentialSavings = (material.gwp - alternative.gwp) × quantity
//! ```
//!
//! The curated `reduction` percentage is passed through untouched.

use serde::{Deserialize, Serialize};

use crate::catalog::{Availability, CatalogSnapshot, Compatibility, CostImpact, Material};
use crate::units::round_to;

/// One recommended substitute.
///
/// ## JSON Example
///
/// ```json
/// {
///   "name": "Recycled Steel (EAF)",
///   "gwp": 0.8,
///   "reduction": 62,
///   "potentialSavings": 1300.0,
///   "compatibility": "drop-in",
///   "costImpact": "similar",
///   "availability": "widely-available"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub name: String,
    pub gwp: f64,
    pub reduction: f64,
    /// kg CO2e, 2 decimal places; negative when the substitute is worse
    pub potential_savings: f64,
    pub compatibility: Compatibility,
    pub cost_impact: CostImpact,
    pub availability: Availability,
}

/// Substitutes for `material`, at most `limit`, in catalog order.
///
/// Returns `None` when the category has no alternatives record, so callers
/// can tell "nothing curated" apart from an empty list.
pub fn recommend_alternatives(
    snapshot: &CatalogSnapshot,
    material: &Material,
    quantity: f64,
    limit: usize,
) -> Option<Vec<Recommendation>> {
    let record = snapshot.alternatives_for(&material.category)?;
    Some(
        record
            .alternatives
            .iter()
            .take(limit)
            .map(|alt| Recommendation {
                name: alt.name.clone(),
                gwp: alt.gwp,
                reduction: alt.reduction,
                potential_savings: round_to((material.gwp - alt.gwp) * quantity, 2),
                compatibility: alt.compatibility,
                cost_impact: alt.cost_impact,
                availability: alt.availability,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AlternativeMaterial, CarbonAlternative, OriginalMaterial};

    fn snapshot() -> CatalogSnapshot {
        let record = CarbonAlternative::new(
            OriginalMaterial {
                category: "Steel".to_string(),
                name: "Virgin Structural Steel".to_string(),
                gwp: 2.1,
                unit: "kg CO2e/kg".to_string(),
            },
            vec![
                AlternativeMaterial::new("Recycled Steel (EAF)", 0.75, "kg CO2e/kg", 62.0),
                AlternativeMaterial::new("Hydrogen DRI Steel", 0.5, "kg CO2e/kg", 76.0),
                AlternativeMaterial::new("Mass Timber", 0.25, "kg CO2e/kg", 88.0),
                AlternativeMaterial::new("Fourth Option", 0.1, "kg CO2e/kg", 95.0),
            ],
        );
        CatalogSnapshot::from_parts(vec![], vec![], vec![], vec![record])
    }

    fn steel(gwp: f64) -> Material {
        Material::new("steel", "Steel", "steel", gwp, "kg CO2e/kg")
    }

    #[test]
    fn test_takes_at_most_limit_in_order() {
        let recs = recommend_alternatives(&snapshot(), &steel(2.0), 100.0, 3).unwrap();
        let names: Vec<&str> = recs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Recycled Steel (EAF)", "Hydrogen DRI Steel", "Mass Timber"]);
    }

    #[test]
    fn test_savings_use_live_gwp() {
        let recs = recommend_alternatives(&snapshot(), &steel(2.0), 100.0, 3).unwrap();
        assert_eq!(recs[0].potential_savings, 125.0);
        assert_eq!(recs[0].reduction, 62.0);
    }

    #[test]
    fn test_savings_scale_linearly() {
        let one = recommend_alternatives(&snapshot(), &steel(2.0), 10.0, 3).unwrap();
        let four = recommend_alternatives(&snapshot(), &steel(2.0), 40.0, 3).unwrap();
        for (a, b) in one.iter().zip(&four) {
            assert_eq!(a.potential_savings * 4.0, b.potential_savings);
        }
    }

    #[test]
    fn test_no_record() {
        let mat = Material::new("w", "Lumber", "Wood", 0.4, "kg CO2e/kg");
        assert!(recommend_alternatives(&snapshot(), &mat, 1.0, 3).is_none());
    }
}
