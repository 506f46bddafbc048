//! # Portfolio Aggregator
//!
//! Runs a whole bill of materials through the pipeline and folds the per-item
//! results into portfolio totals:
//!
//! ```text
//! LineItem → resolve → convert → lifecycle + transport → benchmark → alternatives
//! ```
//!
//! When enabled, the report also carries a [`ProjectAnalysis`] built from the
//! unrounded totals and the request's building profile.
//!
//! The request is validated before any reference data is read; one bad line
//! item rejects the whole request. Materials that cannot be resolved do not:
//! they produce a zero-valued, `unresolved` result and the batch continues.
//!
//! Totals are summed at full precision and rounded once, so a summary total
//! can differ from the sum of the rounded per-item figures.
//!
//! ## Example
//!
//! ```rust
//! use carbon_core::calculations::portfolio::{calculate_with_snapshot, CarbonRequest, LineItem};
//! use carbon_core::catalog::{CatalogSnapshot, Material};
//! use carbon_core::settings::EngineSettings;
//!
//! let snapshot = CatalogSnapshot::from_parts(
//!     vec![Material::new("concrete", "Concrete", "Concrete", 100.0, "kg CO2e/kg")],
//!     vec![],
//!     vec![],
//!     vec![],
//! );
//! let request = CarbonRequest::new(vec![LineItem::by_category("Concrete", 10.0, "kg")]);
//!
//! let report = calculate_with_snapshot(&snapshot, &request, &EngineSettings::default()).unwrap();
//! assert_eq!(report.summary.total_embodied_carbon, 1000.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::benchmark::{evaluate_benchmark, BenchmarkComparison};
use super::conversion::{resolve_conversion, ConversionOutcome, ConversionStatus, DISPLAY_PLACES};
use super::embodied::{
    lifecycle_carbon, transport_carbon, FactorSource, LifecycleCarbon, TransportLeg, TransportMode,
};
use super::project::{analyze_project, MaterialFamily, ProjectAnalysis, ProjectTotals};
use super::recommender::{recommend_alternatives, Recommendation};
use super::resolver::{resolve_material, MaterialQuery, Resolution};
use crate::catalog::{CatalogSnapshot, LoadOptions};
use crate::errors::{CarbonError, CarbonResult};
use crate::settings::EngineSettings;
use crate::store::ReferenceStore;
use crate::units::{round_to, KgCo2e, Kilometers, KG_CO2E};

// ============================================================================
// Request
// ============================================================================

/// One bill-of-materials line.
///
/// ## JSON Example
///
/// ```json
/// {
///   "category": "Concrete",
///   "quantity": 50,
///   "unit": "m³",
///   "transportMode": "truck",
///   "transportDistanceKm": 80
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(flatten)]
    pub query: MaterialQuery,

    /// Narrows the unit conversion record within the category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_type: Option<String>,

    pub quantity: f64,

    pub unit: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_distance_km: Option<f64>,

    /// GWP per native unit of the conventional material this item replaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_gwp: Option<f64>,
}

impl LineItem {
    pub fn new(query: MaterialQuery, quantity: f64, unit: impl Into<String>) -> Self {
        LineItem {
            query,
            material_type: None,
            quantity,
            unit: unit.into(),
            transport_mode: None,
            transport_distance_km: None,
            baseline_gwp: None,
        }
    }

    pub fn by_id(material_id: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self::new(MaterialQuery::by_id(material_id), quantity, unit)
    }

    pub fn by_category(category: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self::new(MaterialQuery::by_category(category), quantity, unit)
    }

    pub fn by_name(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self::new(MaterialQuery::by_name(name), quantity, unit)
    }

    pub fn with_transport(mut self, mode: impl Into<String>, distance_km: f64) -> Self {
        self.transport_mode = Some(mode.into());
        self.transport_distance_km = Some(distance_km);
        self
    }

    pub fn with_baseline_gwp(mut self, gwp: f64) -> Self {
        self.baseline_gwp = Some(gwp);
        self
    }

    /// Check this line; `index` only labels the offending field.
    pub fn validate(&self, index: usize) -> CarbonResult<()> {
        let field = |name: &str| format!("materials[{}].{}", index, name);

        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(CarbonError::invalid_input(
                field("quantity"),
                self.quantity.to_string(),
                "Quantity must be positive",
            ));
        }
        if self.unit.trim().is_empty() {
            return Err(CarbonError::missing_field(field("unit")));
        }
        if let Some(distance) = self.transport_distance_km {
            if !distance.is_finite() || distance <= 0.0 {
                return Err(CarbonError::invalid_input(
                    field("transportDistanceKm"),
                    distance.to_string(),
                    "Transport distance must be positive",
                ));
            }
        }
        if let Some(gwp) = self.baseline_gwp {
            if !gwp.is_finite() || gwp < 0.0 {
                return Err(CarbonError::invalid_input(
                    field("baselineGwp"),
                    gwp.to_string(),
                    "Baseline GWP must be a non-negative number",
                ));
            }
        }
        self.transport_leg()?;
        Ok(())
    }

    /// The transport leg, when both mode and distance are given.
    ///
    /// An unrecognized mode is an error even without a distance.
    pub fn transport_leg(&self) -> CarbonResult<Option<TransportLeg>> {
        let mode = match self.transport_mode.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            Some(mode) => mode.parse::<TransportMode>()?,
            None => return Ok(None),
        };
        Ok(self.transport_distance_km.map(|km| TransportLeg {
            mode,
            distance: Kilometers(km),
        }))
    }
}

/// A bill of materials.
///
/// ## JSON Example
///
/// ```json
/// {
///   "materials": [
///     { "materialId": "steel-rebar", "quantity": 12000, "unit": "kg" },
///     { "name": "glulam", "quantity": 18, "unit": "m³", "transportMode": "rail", "transportDistanceKm": 600 }
///   ],
///   "country": "US",
///   "includeAlternatives": true,
///   "buildingType": "office",
///   "squareFootage": 20000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonRequest {
    pub materials: Vec<LineItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Defaults to the engine setting (on)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_alternatives: Option<bool>,

    /// Defaults to the engine setting (on)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_benchmarks: Option<bool>,

    /// Defaults to the engine setting (on)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_project_analysis: Option<bool>,

    /// Selects the intensity benchmark row (e.g. `office`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,

    /// Gross floor area in square feet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_footage: Option<f64>,
}

impl CarbonRequest {
    pub fn new(materials: Vec<LineItem>) -> Self {
        CarbonRequest {
            materials,
            region: None,
            country: None,
            include_alternatives: None,
            include_benchmarks: None,
            include_project_analysis: None,
            building_type: None,
            square_footage: None,
        }
    }

    pub fn with_building(mut self, building_type: impl Into<String>, square_footage: f64) -> Self {
        self.building_type = Some(building_type.into());
        self.square_footage = Some(square_footage);
        self
    }

    pub fn validate(&self) -> CarbonResult<()> {
        if self.materials.is_empty() {
            return Err(CarbonError::invalid_input(
                "materials",
                "[]",
                "At least one material is required",
            ));
        }
        if let Some(area) = self.square_footage {
            if !area.is_finite() || area <= 0.0 {
                return Err(CarbonError::invalid_input(
                    "squareFootage",
                    area.to_string(),
                    "Square footage must be positive",
                ));
            }
        }
        self.materials
            .iter()
            .enumerate()
            .try_for_each(|(idx, item)| item.validate(idx))
    }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Resolved,
    Unresolved,
}

/// Identity of the material an item was calculated against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRef {
    pub id: String,
    pub name: String,
    pub category: String,
}

impl MaterialRef {
    /// Placeholder identity for an unresolved query
    fn unknown(query: &MaterialQuery) -> Self {
        MaterialRef {
            id: query.material_id().unwrap_or("unknown").to_string(),
            name: query
                .name()
                .or_else(|| query.category())
                .unwrap_or("Unknown")
                .to_string(),
            category: query.category().unwrap_or("Unknown").to_string(),
        }
    }
}

/// Echo of the declared quantity, plus the converted one when applicable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEcho {
    pub quantity: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_unit: Option<String>,
    /// Absent for unresolved items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion: Option<ConversionStatus>,
}

/// A1-A5 carbon, rounded to 2 decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbodiedCarbon {
    pub a1a3: f64,
    pub a4: f64,
    pub a5: f64,
    pub total: f64,
    pub unit: String,
}

impl From<LifecycleCarbon> for EmbodiedCarbon {
    fn from(c: LifecycleCarbon) -> Self {
        EmbodiedCarbon {
            a1a3: c.a1a3.rounded(),
            a4: c.a4.rounded(),
            a5: c.a5.rounded(),
            total: c.total().rounded(),
            unit: KG_CO2E.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportReport {
    pub mode: TransportMode,
    pub distance_km: f64,
    /// kg CO2e, 2 decimals
    pub emissions: f64,
    /// kg CO2e per ton-km
    pub factor: f64,
    pub factor_source: FactorSource,
    pub unit: String,
}

/// Result for one line item.
///
/// ## JSON Example
///
/// ```json
/// {
///   "status": "resolved",
///   "material": { "id": "steel-rebar", "name": "Reinforcing Steel (Rebar)", "category": "Steel" },
///   "input": { "quantity": 500, "unit": "kg", "conversion": "notRequired" },
///   "embodiedCarbon": { "a1a3": 600.0, "a4": 15.0, "a5": 0.0, "total": 615.0, "unit": "kg CO2e" },
///   "transport": { "mode": "truck", "distanceKm": 200, "emissions": 10.5, "factor": 0.105,
///                  "factorSource": "catalog", "unit": "kg CO2e" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    pub status: ItemStatus,
    pub material: MaterialRef,
    pub input: InputEcho,
    pub embodied_carbon: EmbodiedCarbon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmarks: Option<BenchmarkComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<Recommendation>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_embodied_carbon: f64,
    pub total_transport_carbon: f64,
    pub total_carbon: f64,
    pub unit: String,
    pub material_count: usize,
    pub unresolved_count: usize,
}

/// Full calculation output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonReport {
    pub materials: Vec<ItemResult>,
    pub summary: PortfolioSummary,
    pub region: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectAnalysis>,
}

// ============================================================================
// Calculation
// ============================================================================

/// Request options merged with engine settings
#[derive(Debug, Clone, Copy)]
struct Context<'a> {
    country: &'a str,
    include_benchmarks: bool,
    include_alternatives: bool,
    include_project_analysis: bool,
    max_alternatives: usize,
    fallback_factor: f64,
}

/// Per-item result with the unrounded figures the totals are built from
struct ItemCalculation {
    result: ItemResult,
    embodied: KgCo2e,
    transport: KgCo2e,
    /// Against the line's baseline GWP, never negative
    saved: KgCo2e,
    /// From the best alternative, never negative
    potential: KgCo2e,
    family: Option<MaterialFamily>,
}

fn calculate_item(
    snapshot: &CatalogSnapshot,
    item: &LineItem,
    ctx: &Context<'_>,
) -> CarbonResult<ItemCalculation> {
    let material = match resolve_material(snapshot, &item.query) {
        Resolution::Resolved(material) => material,
        Resolution::Unresolved(query) => {
            return Ok(ItemCalculation {
                result: ItemResult {
                    status: ItemStatus::Unresolved,
                    material: MaterialRef::unknown(&query),
                    input: InputEcho {
                        quantity: item.quantity,
                        unit: item.unit.clone(),
                        converted_quantity: None,
                        converted_unit: None,
                        conversion: None,
                    },
                    embodied_carbon: LifecycleCarbon::default().into(),
                    transport: None,
                    benchmarks: None,
                    alternatives: None,
                },
                embodied: KgCo2e(0.0),
                transport: KgCo2e(0.0),
                saved: KgCo2e(0.0),
                potential: KgCo2e(0.0),
                family: None,
            });
        }
    };

    let native_unit = material.native_unit();
    let conversion = resolve_conversion(
        snapshot,
        &material.category,
        item.material_type.as_deref(),
        item.quantity,
        &item.unit,
        &native_unit,
    );
    let (quantity, working_unit) = conversion.working(item.quantity, &item.unit);

    let lifecycle = lifecycle_carbon(material, quantity);

    let transport = item.transport_leg()?.map(|leg| {
        transport_carbon(
            snapshot,
            leg,
            material,
            quantity,
            working_unit,
            ctx.country,
            ctx.fallback_factor,
        )
    });

    let benchmarks = if ctx.include_benchmarks {
        evaluate_benchmark(material)
    } else {
        None
    };

    let recommendations = if ctx.include_alternatives || ctx.include_project_analysis {
        recommend_alternatives(snapshot, material, quantity, ctx.max_alternatives)
    } else {
        None
    };
    let potential = recommendations
        .iter()
        .flatten()
        .map(|r| r.potential_savings)
        .fold(0.0, f64::max);
    let alternatives = recommendations.filter(|_| ctx.include_alternatives);

    let saved = item
        .baseline_gwp
        .map(|baseline| (baseline * quantity - lifecycle.a1a3.value()).max(0.0))
        .unwrap_or(0.0);

    let (converted_quantity, converted_unit) = match &conversion {
        ConversionOutcome::Converted { quantity, unit, .. } => {
            (Some(round_to(*quantity, DISPLAY_PLACES)), Some(unit.clone()))
        }
        _ => (None, None),
    };

    debug!(
        material_id = %material.material_id,
        quantity,
        unit = working_unit,
        embodied = lifecycle.total().value(),
        "line item calculated"
    );

    Ok(ItemCalculation {
        result: ItemResult {
            status: ItemStatus::Resolved,
            material: MaterialRef {
                id: material.material_id.clone(),
                name: material.name.clone(),
                category: material.category.clone(),
            },
            input: InputEcho {
                quantity: item.quantity,
                unit: item.unit.clone(),
                converted_quantity,
                converted_unit,
                conversion: Some(conversion.status()),
            },
            embodied_carbon: lifecycle.into(),
            transport: transport.map(|t| TransportReport {
                mode: t.leg.mode,
                distance_km: t.leg.distance.value(),
                emissions: t.emissions.rounded(),
                factor: t.factor,
                factor_source: t.factor_source,
                unit: KG_CO2E.to_string(),
            }),
            benchmarks,
            alternatives,
        },
        embodied: lifecycle.total(),
        transport: transport.map(|t| t.emissions).unwrap_or_default(),
        saved: KgCo2e(saved),
        potential: KgCo2e(potential),
        family: MaterialFamily::of_material(&material.name, &material.category),
    })
}

/// Calculate a validated request against an already-loaded snapshot.
pub fn calculate_with_snapshot(
    snapshot: &CatalogSnapshot,
    request: &CarbonRequest,
    settings: &EngineSettings,
) -> CarbonResult<CarbonReport> {
    request.validate()?;

    let country = request
        .country
        .as_deref()
        .unwrap_or(&settings.default_country);
    let ctx = Context {
        country,
        include_benchmarks: request.include_benchmarks.unwrap_or(settings.include_benchmarks),
        include_alternatives: request
            .include_alternatives
            .unwrap_or(settings.include_alternatives),
        include_project_analysis: request
            .include_project_analysis
            .unwrap_or(settings.include_project_analysis),
        max_alternatives: settings.max_alternatives,
        fallback_factor: settings.fallback_transport_factor,
    };

    let mut materials = Vec::with_capacity(request.materials.len());
    let mut total_embodied = KgCo2e(0.0);
    let mut total_transport = KgCo2e(0.0);
    let mut project_totals = ProjectTotals::default();

    for item in &request.materials {
        let calc = calculate_item(snapshot, item, &ctx)?;
        total_embodied += calc.embodied;
        total_transport += calc.transport;
        project_totals.carbon_saved += calc.saved;
        project_totals.potential_savings += calc.potential;
        project_totals.families.extend(calc.family);
        materials.push(calc.result);
    }
    project_totals.total_carbon = total_embodied + total_transport;

    let unresolved_count = materials
        .iter()
        .filter(|m| m.status == ItemStatus::Unresolved)
        .count();

    let summary = PortfolioSummary {
        total_embodied_carbon: total_embodied.rounded(),
        total_transport_carbon: total_transport.rounded(),
        total_carbon: (total_embodied + total_transport).rounded(),
        unit: KG_CO2E.to_string(),
        material_count: materials.len(),
        unresolved_count,
    };

    info!(
        materials = summary.material_count,
        unresolved = summary.unresolved_count,
        total_carbon = summary.total_carbon,
        "portfolio calculated"
    );

    Ok(CarbonReport {
        materials,
        summary,
        region: request
            .region
            .clone()
            .unwrap_or_else(|| settings.default_region.clone()),
        country: country.to_string(),
        project: ctx.include_project_analysis.then(|| {
            analyze_project(
                &project_totals,
                request.building_type.as_deref(),
                request.square_footage,
            )
        }),
    })
}

/// Validate a request, load a snapshot from `store`, and calculate.
///
/// Validation runs before any catalog is read. A store failure fails the
/// whole request; no partial report is produced.
pub async fn calculate_portfolio<S>(
    store: &S,
    request: &CarbonRequest,
    settings: &EngineSettings,
) -> CarbonResult<CarbonReport>
where
    S: ReferenceStore + ?Sized,
{
    settings.validate()?;
    request.validate()?;

    // Project savings read the alternatives even when they are not listed
    let options = LoadOptions {
        include_alternatives: request
            .include_alternatives
            .unwrap_or(settings.include_alternatives)
            || request
                .include_project_analysis
                .unwrap_or(settings.include_project_analysis),
    };
    let snapshot = CatalogSnapshot::load(store, options).await?;
    calculate_with_snapshot(&snapshot, request, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        AlternativeMaterial, BenchmarkStats, CarbonAlternative, CarbonFactor, ConversionEntry, Material,
        OriginalMaterial, UnitConversion,
    };
    use crate::store::{FindQuery, InMemoryStore, StoreError};
    use async_trait::async_trait;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_material(Material::new("concrete", "Concrete", "Concrete", 100.0, "kg CO2e/kg"))
            .with_material(
                Material::new("ready-mix", "Ready-Mix Concrete", "Ready-Mix", 350.0, "kg CO2e/m³")
                    .with_density(2400.0)
                    .with_benchmarks(BenchmarkStats {
                        percentile: 50.0,
                        industry_avg: 350.0,
                        best_in_class: 150.0,
                        worst_in_class: None,
                    }),
            )
            .with_material(Material::new("steel", "Structural Steel", "Steel", 2.0, "kg CO2e/kg"))
            .with_conversion(
                UnitConversion::new("Ready-Mix")
                    .with_density(2400.0)
                    .with_entry(ConversionEntry::new("yd³", "m³", 0.7646)),
            )
            .with_factor(CarbonFactor::transport("transport-rail", 0.028))
            .with_alternative(CarbonAlternative::new(
                OriginalMaterial {
                    category: "Steel".to_string(),
                    name: "Virgin Steel".to_string(),
                    gwp: 2.1,
                    unit: "kg CO2e/kg".to_string(),
                },
                vec![AlternativeMaterial::new("Recycled Steel", 0.75, "kg CO2e/kg", 62.0)],
            ))
    }

    async fn run(request: &CarbonRequest) -> CarbonResult<CarbonReport> {
        calculate_portfolio(&store(), request, &EngineSettings::default()).await
    }

    #[tokio::test]
    async fn test_concrete_scenario() {
        let report = run(&CarbonRequest::new(vec![LineItem::by_category("Concrete", 10.0, "kg")]))
            .await
            .unwrap();
        let item = &report.materials[0];
        assert_eq!(item.status, ItemStatus::Resolved);
        assert_eq!(item.embodied_carbon.a1a3, 1000.0);
        assert_eq!(item.embodied_carbon.total, 1000.0);
        assert_eq!(item.input.conversion, Some(ConversionStatus::NotRequired));
        assert_eq!(report.summary.total_carbon, 1000.0);
        assert_eq!(report.region, "North America");
        assert_eq!(report.country, "US");
    }

    #[tokio::test]
    async fn test_truck_default_factor_scenario() {
        let item = LineItem::by_id("steel", 500.0, "kg").with_transport("truck", 200.0);
        let report = run(&CarbonRequest::new(vec![item])).await.unwrap();
        let transport = report.materials[0].transport.as_ref().unwrap();
        assert_eq!(transport.emissions, 10.5);
        assert_eq!(transport.factor_source, FactorSource::Default);
        assert_eq!(report.summary.total_transport_carbon, 10.5);
        assert_eq!(report.summary.total_carbon, 1010.5);
    }

    #[tokio::test]
    async fn test_unresolved_item_does_not_abort_batch() {
        let request = CarbonRequest::new(vec![
            LineItem::by_category("Concrete", 10.0, "kg"),
            LineItem::by_name("Unobtainium", 5.0, "kg"),
            LineItem::by_id("steel", 100.0, "kg"),
        ]);
        let report = run(&request).await.unwrap();

        assert_eq!(report.materials.len(), 3);
        assert!(report.materials[0].embodied_carbon.total > 0.0);
        assert!(report.materials[2].embodied_carbon.total > 0.0);

        let missing = &report.materials[1];
        assert_eq!(missing.status, ItemStatus::Unresolved);
        assert_eq!(missing.embodied_carbon.total, 0.0);
        assert_eq!(missing.material.id, "unknown");
        assert_eq!(missing.material.name, "Unobtainium");
        assert_eq!(missing.material.category, "Unknown");
        assert_eq!(report.summary.unresolved_count, 1);
        assert_eq!(report.summary.material_count, 3);
    }

    #[tokio::test]
    async fn test_output_order_matches_input() {
        let request = CarbonRequest::new(vec![
            LineItem::by_id("steel", 1.0, "kg"),
            LineItem::by_id("concrete", 1.0, "kg"),
            LineItem::by_id("ready-mix", 1.0, "m³"),
        ]);
        let report = run(&request).await.unwrap();
        let ids: Vec<&str> = report.materials.iter().map(|m| m.material.id.as_str()).collect();
        assert_eq!(ids, ["steel", "concrete", "ready-mix"]);
    }

    #[tokio::test]
    async fn test_conversion_and_benchmarks() {
        let report = run(&CarbonRequest::new(vec![LineItem::by_id("ready-mix", 2400.0, "kg")]))
            .await
            .unwrap();
        let item = &report.materials[0];
        assert_eq!(item.input.conversion, Some(ConversionStatus::Converted));
        assert_eq!(item.input.converted_quantity, Some(1.0));
        assert_eq!(item.input.converted_unit.as_deref(), Some("m³"));
        assert!(approx_eq(item.embodied_carbon.total, 350.0));

        let bench = item.benchmarks.unwrap();
        assert_eq!(bench.vs_industry_avg, 0);
        assert_eq!(bench.vs_best_in_class, 133);
    }

    #[tokio::test]
    async fn test_conversion_unavailable_uses_declared_quantity() {
        let report = run(&CarbonRequest::new(vec![LineItem::by_id("steel", 3.0, "m²")]))
            .await
            .unwrap();
        let item = &report.materials[0];
        assert_eq!(item.input.conversion, Some(ConversionStatus::Unavailable));
        assert!(item.input.converted_quantity.is_none());
        assert_eq!(item.embodied_carbon.total, 6.0);
    }

    #[tokio::test]
    async fn test_flags_disable_optional_blocks() {
        let mut request = CarbonRequest::new(vec![
            LineItem::by_id("steel", 100.0, "kg"),
            LineItem::by_id("ready-mix", 1.0, "m³"),
        ]);
        let full = run(&request).await.unwrap();
        assert_eq!(
            full.materials[0].alternatives.as_ref().unwrap()[0].potential_savings,
            125.0
        );
        assert!(full.materials[1].benchmarks.is_some());

        request.include_alternatives = Some(false);
        request.include_benchmarks = Some(false);
        let bare = run(&request).await.unwrap();
        assert!(bare.materials[0].alternatives.is_none());
        assert!(bare.materials[1].benchmarks.is_none());
    }

    #[tokio::test]
    async fn test_catalog_transport_factor() {
        let item = LineItem::by_id("steel", 2000.0, "kg").with_transport("rail", 1000.0);
        let report = run(&CarbonRequest::new(vec![item])).await.unwrap();
        let transport = report.materials[0].transport.as_ref().unwrap();
        assert_eq!(transport.mode, TransportMode::Rail);
        assert_eq!(transport.factor_source, FactorSource::Catalog);
        assert_eq!(transport.emissions, 56.0);
    }

    #[test]
    fn test_summary_rounds_once() {
        let snapshot = CatalogSnapshot::from_parts(
            vec![Material::new("tiny", "Tiny", "Misc", 0.001, "kg CO2e/kg")],
            vec![],
            vec![],
            vec![],
        );
        let request = CarbonRequest::new(vec![
            LineItem::by_id("tiny", 4.0, "kg"),
            LineItem::by_id("tiny", 4.0, "kg"),
            LineItem::by_id("tiny", 4.0, "kg"),
        ]);
        let report = calculate_with_snapshot(&snapshot, &request, &EngineSettings::default()).unwrap();
        assert!(report.materials.iter().all(|m| m.embodied_carbon.total == 0.0));
        assert_eq!(report.summary.total_embodied_carbon, 0.01);
    }

    #[test]
    fn test_validation_errors() {
        let snapshot = CatalogSnapshot::default();
        let settings = EngineSettings::default();

        let empty = CarbonRequest::new(vec![]);
        assert_eq!(
            calculate_with_snapshot(&snapshot, &empty, &settings).unwrap_err().status_code(),
            400
        );

        let zero = CarbonRequest::new(vec![LineItem::by_id("x", 0.0, "kg")]);
        match calculate_with_snapshot(&snapshot, &zero, &settings).unwrap_err() {
            CarbonError::InvalidInput { field, .. } => assert_eq!(field, "materials[0].quantity"),
            other => panic!("unexpected error: {:?}", other),
        }

        let bad_mode = CarbonRequest::new(vec![LineItem::by_id("x", 1.0, "kg").with_transport("hovercraft", 5.0)]);
        assert_eq!(
            calculate_with_snapshot(&snapshot, &bad_mode, &settings).unwrap_err().error_code(),
            "UNKNOWN_TRANSPORT_MODE"
        );

        let bad_distance = CarbonRequest::new(vec![LineItem::by_id("x", 1.0, "kg").with_transport("rail", -1.0)]);
        assert!(calculate_with_snapshot(&snapshot, &bad_distance, &settings).is_err());
    }

    struct FailingStore;

    #[async_trait]
    impl ReferenceStore for FailingStore {
        async fn find_materials(&self, _: &FindQuery) -> Result<Vec<Material>, StoreError> {
            Ok(Vec::new())
        }
        async fn find_carbon_factors(&self, _: &FindQuery) -> Result<Vec<CarbonFactor>, StoreError> {
            Err(StoreError::unavailable("carbonFactors", "connection reset"))
        }
        async fn find_unit_conversions(&self, _: &FindQuery) -> Result<Vec<UnitConversion>, StoreError> {
            Ok(Vec::new())
        }
        async fn find_carbon_alternatives(&self, _: &FindQuery) -> Result<Vec<CarbonAlternative>, StoreError> {
            Ok(Vec::new())
        }
        async fn find_epd_programs(
            &self,
            _: &FindQuery,
        ) -> Result<Vec<crate::catalog::EpdProgram>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_fatal() {
        let request = CarbonRequest::new(vec![LineItem::by_category("Concrete", 1.0, "kg")]);
        let err = calculate_portfolio(&FailingStore, &request, &EngineSettings::default())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "REFERENCE_DATA_UNAVAILABLE");
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_validation_precedes_store_access() {
        let request = CarbonRequest::new(vec![LineItem::by_category("Concrete", -1.0, "kg")]);
        let err = calculate_portfolio(&FailingStore, &request, &EngineSettings::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_request_json_shape() {
        let json = r#"{
            "materials": [
                { "materialId": "steel", "quantity": 10, "unit": "kg", "transportMode": "road", "transportDistanceKm": 50 }
            ],
            "includeBenchmarks": false
        }"#;
        let request: CarbonRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.materials[0].query.material_id(), Some("steel"));
        assert_eq!(request.include_benchmarks, Some(false));
        assert!(request.include_alternatives.is_none());
        assert_eq!(
            request.materials[0].transport_leg().unwrap().unwrap().mode,
            TransportMode::Truck
        );
    }

    #[tokio::test]
    async fn test_project_analysis() {
        let request = CarbonRequest::new(vec![
            LineItem::by_id("steel", 1000.0, "kg").with_baseline_gwp(2.5),
            LineItem::by_id("concrete", 10.0, "kg"),
            LineItem::by_name("Unobtainium", 5.0, "kg").with_baseline_gwp(9.0),
        ])
        .with_building("Office", 100.0);
        let report = run(&request).await.unwrap();
        let project = report.project.unwrap();

        assert!(approx_eq(project.carbon_saved, 500.0));
        assert!(approx_eq(project.percent_reduction, 14.29));
        assert!(approx_eq(project.potential_savings, 1250.0));
        assert!(approx_eq(project.carbon_per_sq_ft.unwrap(), 30.0));
        let bench = project.benchmark.unwrap();
        assert_eq!(bench.building_type, "office");
        assert_eq!(bench.percentile, 29);
        assert_eq!(
            project.material_families,
            [MaterialFamily::Concrete, MaterialFamily::Steel]
        );
        assert_eq!(project.equivalents.trees, 143);
        assert!(project.reduction_tips.len() > 3);
    }

    #[tokio::test]
    async fn test_project_savings_without_listing_alternatives() {
        let mut request = CarbonRequest::new(vec![LineItem::by_id("steel", 1000.0, "kg")]);
        request.include_alternatives = Some(false);
        let report = run(&request).await.unwrap();
        assert!(report.materials[0].alternatives.is_none());
        let project = report.project.unwrap();
        assert!(approx_eq(project.potential_savings, 1250.0));
        assert!(project.benchmark.is_none());

        request.include_project_analysis = Some(false);
        assert!(run(&request).await.unwrap().project.is_none());
    }

    #[tokio::test]
    async fn test_project_inputs_are_validated() {
        let bad_area = CarbonRequest::new(vec![LineItem::by_id("steel", 1.0, "kg")]).with_building("office", 0.0);
        assert!(run(&bad_area).await.unwrap_err().is_validation());

        let bad_baseline = CarbonRequest::new(vec![LineItem::by_id("steel", 1.0, "kg").with_baseline_gwp(f64::NAN)]);
        assert!(run(&bad_baseline).await.unwrap_err().is_validation());
    }

    #[test]
    fn test_project_fields_from_json() {
        let json = r#"{
            "materials": [{ "materialId": "steel", "quantity": 1, "unit": "kg", "baselineGwp": 2.4 }],
            "buildingType": "retail",
            "squareFootage": 5000
        }"#;
        let request: CarbonRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.building_type.as_deref(), Some("retail"));
        assert_eq!(request.square_footage, Some(5000.0));
        assert_eq!(request.materials[0].baseline_gwp, Some(2.4));
    }
}
