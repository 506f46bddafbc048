//! # Benchmark Evaluator
//!
//! Places a material's GWP against its category statistics. Deviations are
//! whole percentages, rounded half-up; negative means better than the
//! reference figure.

use serde::{Deserialize, Serialize};

use crate::catalog::Material;
use crate::units::round_percent;

/// Benchmark block reported for a line item.
///
/// ## JSON Example
///
/// ```json
/// { "percentile": 50, "vsIndustryAvg": 0, "vsBestInClass": 133, "worstInClass": 500 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub percentile: f64,
    pub vs_industry_avg: i64,
    pub vs_best_in_class: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worst_in_class: Option<f64>,
}

/// Percentage deviation of `value` from `reference`, rounded half-up
pub fn deviation_percent(value: f64, reference: f64) -> i64 {
    round_percent((value - reference) / reference * 100.0)
}

/// Compare a material against its benchmarks.
///
/// Returns `None` when the material has no benchmarks, or when either
/// reference figure is not positive.
pub fn evaluate_benchmark(material: &Material) -> Option<BenchmarkComparison> {
    let stats = material.benchmarks?;
    if !(stats.industry_avg > 0.0 && stats.best_in_class > 0.0) {
        return None;
    }
    Some(BenchmarkComparison {
        percentile: stats.percentile,
        vs_industry_avg: deviation_percent(material.gwp, stats.industry_avg),
        vs_best_in_class: deviation_percent(material.gwp, stats.best_in_class),
        worst_in_class: stats.worst_in_class,
    })
}
