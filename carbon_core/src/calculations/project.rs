//! # Project Analysis
//!
//! Whole-project view of a calculated bill of materials: carbon intensity
//! against building-type benchmarks, savings already achieved and still
//! available, everyday equivalents of the total, and reduction tips for the
//! material families present.
//!
//! ## Formulas
//!
//! ```text
//! carbonPerSqFt     = totalCarbon / squareFootage
//! percentile        = clamp((average - carbonPerSqFt) / (average - bestInClass) × 100, 0, 100)
//! percentReduction  = carbonSaved / (totalCarbon + carbonSaved) × 100
//! ```
//!
//! Building benchmarks are kg CO2e per square foot. An unknown building type
//! uses the `default` row.
//!
//! ## Example
//!
//! ```rust
//! use carbon_core::calculations::project::{analyze_project, ProjectTotals};
//! use carbon_core::units::KgCo2e;
//!
//! let totals = ProjectTotals {
//!     total_carbon: KgCo2e(350_000.0),
//!     ..Default::default()
//! };
//! let analysis = analyze_project(&totals, Some("office"), Some(10_000.0));
//! let benchmark = analysis.benchmark.unwrap();
//! assert_eq!(benchmark.carbon_per_sq_ft, 35.0);
//! assert_eq!(benchmark.percentile, 0);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::units::{round_percent, round_to, KgCo2e};

// ============================================================================
// Building benchmarks
// ============================================================================

/// Embodied carbon intensity reference for one building type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingBenchmark {
    pub building_type: &'static str,
    /// kg CO2e per sq ft
    pub average: f64,
    /// kg CO2e per sq ft
    pub best_in_class: f64,
}

const fn building(building_type: &'static str, average: f64, best_in_class: f64) -> BuildingBenchmark {
    BuildingBenchmark {
        building_type,
        average,
        best_in_class,
    }
}

pub const DEFAULT_BUILDING_BENCHMARK: BuildingBenchmark = building("default", 35.0, 18.0);

pub const BUILDING_BENCHMARKS: [BuildingBenchmark; 7] = [
    building("office", 35.0, 18.0),
    building("residential", 28.0, 14.0),
    building("retail", 32.0, 16.0),
    building("healthcare", 45.0, 25.0),
    building("education", 30.0, 15.0),
    building("industrial", 40.0, 22.0),
    building("hospitality", 38.0, 20.0),
];

/// Benchmark row for a building type (case-insensitive), or the default row
pub fn building_benchmark(building_type: &str) -> BuildingBenchmark {
    let wanted = building_type.trim().to_lowercase();
    BUILDING_BENCHMARKS
        .iter()
        .copied()
        .find(|b| b.building_type == wanted)
        .unwrap_or(DEFAULT_BUILDING_BENCHMARK)
}

/// Project intensity placed against its building type.
///
/// ## JSON Example
///
/// ```json
/// { "buildingType": "office", "carbonPerSqFt": 26.5, "industryAverage": 35.0, "bestInClass": 18.0, "percentile": 50 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntensityBenchmark {
    /// The benchmark row used; `default` for unknown types
    pub building_type: String,
    /// kg CO2e per sq ft, 2 decimals
    pub carbon_per_sq_ft: f64,
    pub industry_average: f64,
    pub best_in_class: f64,
    /// 0 at or above the average, 100 at or below best in class
    pub percentile: i64,
}

/// Place `total` over `square_footage` against the building-type benchmark.
///
/// A non-positive floor area gives an intensity of zero.
pub fn evaluate_intensity(total: KgCo2e, square_footage: f64, building_type: &str) -> IntensityBenchmark {
    let row = building_benchmark(building_type);
    let per_sq_ft = if square_footage > 0.0 {
        total.value() / square_footage
    } else {
        0.0
    };
    let range = row.average - row.best_in_class;
    let position = row.average - per_sq_ft;
    let percentile = (position / range * 100.0).clamp(0.0, 100.0);

    IntensityBenchmark {
        building_type: row.building_type.to_string(),
        carbon_per_sq_ft: round_to(per_sq_ft, 2),
        industry_average: row.average,
        best_in_class: row.best_in_class,
        percentile: round_percent(percentile),
    }
}

// ============================================================================
// Equivalents
// ============================================================================

/// kg CO2 absorbed by one tree in a year
pub const KG_PER_TREE_YEAR: f64 = 21.0;
/// kg CO2 per passenger-car mile
pub const KG_PER_CAR_MILE: f64 = 0.404;
/// kg CO2 per hour of flight
pub const KG_PER_FLIGHT_HOUR: f64 = 90.0;
/// kg CO2 from an average home's energy use in a year
pub const KG_PER_HOME_YEAR: f64 = 7700.0;

/// Everyday equivalents of an amount of carbon, rounded to whole units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonEquivalents {
    /// Tree-years of absorption
    pub trees: i64,
    pub car_miles: i64,
    pub flight_hours: i64,
    /// Home-years of energy use
    pub home_energy: i64,
}

pub fn carbon_equivalents(carbon: KgCo2e) -> CarbonEquivalents {
    let kg = carbon.value();
    CarbonEquivalents {
        trees: round_percent(kg / KG_PER_TREE_YEAR),
        car_miles: round_percent(kg / KG_PER_CAR_MILE),
        flight_hours: round_percent(kg / KG_PER_FLIGHT_HOUR),
        home_energy: round_percent(kg / KG_PER_HOME_YEAR),
    }
}

// ============================================================================
// Material families and tips
// ============================================================================

/// Broad material family used to pick reduction tips.
///
/// Variant order is the order tips are listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialFamily {
    Concrete,
    Steel,
    Aluminum,
    Lumber,
    Insulation,
    Glass,
}

impl MaterialFamily {
    /// Family named by a free-text label. Concrete wins over steel, so
    /// "steel-reinforced concrete" is concrete.
    pub fn detect(label: &str) -> Option<MaterialFamily> {
        let label = label.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| label.contains(w));

        if has(&["concrete", "cement"]) {
            Some(MaterialFamily::Concrete)
        } else if has(&["steel", "rebar"]) {
            Some(MaterialFamily::Steel)
        } else if has(&["aluminum", "aluminium"]) {
            Some(MaterialFamily::Aluminum)
        } else if has(&["insulation"]) {
            Some(MaterialFamily::Insulation)
        } else if has(&["lumber", "wood", "timber"]) {
            Some(MaterialFamily::Lumber)
        } else if has(&["glass"]) {
            Some(MaterialFamily::Glass)
        } else {
            None
        }
    }

    /// Detect from a material name, falling back to its category
    pub fn of_material(name: &str, category: &str) -> Option<MaterialFamily> {
        Self::detect(name).or_else(|| Self::detect(category))
    }

    fn tips(&self) -> &'static [&'static str] {
        match self {
            MaterialFamily::Concrete => &[
                "Replace part of the cement with supplementary cementitious materials such as fly ash or slag; this can cut concrete carbon by up to 50%",
                "Specify concrete cured or mineralized with captured CO2",
            ],
            MaterialFamily::Steel => &[
                "Specify at least 90% recycled steel content; this can cut steel carbon by up to 60%",
                "Prefer electric arc furnace (EAF) steel to blast furnace steel",
            ],
            MaterialFamily::Aluminum => &[
                "Use recycled aluminum wherever possible; it needs about 95% less energy than primary aluminum",
            ],
            MaterialFamily::Lumber => &[
                "Source FSC-certified or regional timber",
                "Consider mass timber (CLT, glulam) in place of steel or concrete for structural elements",
            ],
            MaterialFamily::Insulation => &[
                "Natural insulation such as cellulose, hemp, or cork carries far less embodied carbon",
            ],
            MaterialFamily::Glass => &[],
        }
    }
}

/// Tips that apply to every project
pub const GENERAL_TIPS: [&str; 3] = [
    "Ask every supplier for an Environmental Product Declaration (EPD) to replace generic carbon data",
    "Optimize structural systems to reduce material quantities",
    "Design for deconstruction so materials can be reused at end of life",
];

/// Family tips in family order, then the general tips
pub fn reduction_tips(families: &BTreeSet<MaterialFamily>) -> Vec<String> {
    families
        .iter()
        .flat_map(|f| f.tips().iter())
        .chain(GENERAL_TIPS.iter())
        .map(|tip| tip.to_string())
        .collect()
}

// ============================================================================
// Analysis
// ============================================================================

/// Unrounded project figures collected while a portfolio is calculated
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectTotals {
    pub total_carbon: KgCo2e,
    /// Savings already made against each item's baseline GWP
    pub carbon_saved: KgCo2e,
    /// Savings still available from each item's best alternative
    pub potential_savings: KgCo2e,
    pub families: BTreeSet<MaterialFamily>,
}

/// Project-level block of a report.
///
/// ## JSON Example
///
/// ```json
/// {
///   "buildingType": "office",
///   "squareFootage": 20000,
///   "carbonPerSqFt": 26.5,
///   "carbonSaved": 12000.0,
///   "potentialSavings": 98000.0,
///   "percentReduction": 2.21,
///   "benchmark": { "buildingType": "office", "carbonPerSqFt": 26.5, "industryAverage": 35.0, "bestInClass": 18.0, "percentile": 50 },
///   "equivalents": { "trees": 25238, "carMiles": 1311881, "flightHours": 5889, "homeEnergy": 69 },
///   "materialFamilies": ["concrete", "steel"],
///   "reductionTips": ["..."]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_footage: Option<f64>,
    /// kg CO2e per sq ft, 2 decimals; present whenever a floor area is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_per_sq_ft: Option<f64>,
    pub carbon_saved: f64,
    pub potential_savings: f64,
    /// Share of the baseline already saved, 2 decimals
    pub percent_reduction: f64,
    /// Present when both building type and floor area are given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<IntensityBenchmark>,
    pub equivalents: CarbonEquivalents,
    pub material_families: Vec<MaterialFamily>,
    pub reduction_tips: Vec<String>,
}

/// Build the project block from portfolio totals and the optional building
/// profile.
pub fn analyze_project(
    totals: &ProjectTotals,
    building_type: Option<&str>,
    square_footage: Option<f64>,
) -> ProjectAnalysis {
    let building_type = building_type.map(str::trim).filter(|t| !t.is_empty());
    let square_footage = square_footage.filter(|sf| *sf > 0.0);

    let baseline = totals.total_carbon + totals.carbon_saved;
    let percent_reduction = if baseline.value() > 0.0 {
        round_to(totals.carbon_saved.value() / baseline.value() * 100.0, 2)
    } else {
        0.0
    };

    let benchmark = match (building_type, square_footage) {
        (Some(kind), Some(area)) => Some(evaluate_intensity(totals.total_carbon, area, kind)),
        _ => None,
    };

    ProjectAnalysis {
        building_type: building_type.map(str::to_string),
        square_footage,
        carbon_per_sq_ft: square_footage.map(|area| round_to(totals.total_carbon.value() / area, 2)),
        carbon_saved: totals.carbon_saved.rounded(),
        potential_savings: totals.potential_savings.rounded(),
        percent_reduction,
        benchmark,
        equivalents: carbon_equivalents(totals.total_carbon),
        material_families: totals.families.iter().copied().collect(),
        reduction_tips: reduction_tips(&totals.families),
    }
}
