//! # Carbon Calculations
//!
//! The calculation pipeline, one module per stage. Each stage is a pure
//! function over a [`crate::catalog::CatalogSnapshot`]; only
//! [`portfolio::calculate_portfolio`] touches a store.
//!
//! - [`resolver`] - loose material reference to one catalog record
//! - [`conversion`] - declared unit to the material's native unit
//! - [`embodied`] - A1-A5 lifecycle carbon and transport emissions
//! - [`benchmark`] - deviation from industry statistics
//! - [`recommender`] - lower-carbon substitutes and projected savings
//! - [`portfolio`] - whole bill of materials, totals, request/report types
//! - [`project`] - building intensity benchmarks, equivalents, reduction tips

pub mod benchmark;
pub mod conversion;
pub mod embodied;
pub mod portfolio;
pub mod project;
pub mod recommender;
pub mod resolver;

// Re-export commonly used types
pub use benchmark::{evaluate_benchmark, BenchmarkComparison};
pub use conversion::{convert_units, ConversionMethod, ConversionRequest, ConversionResult, ConversionStatus};
pub use embodied::{lifecycle_carbon, shipped_weight, TransportMode};
pub use portfolio::{
    calculate_portfolio, calculate_with_snapshot, CarbonReport, CarbonRequest, ItemResult, ItemStatus,
    LineItem, PortfolioSummary,
};
pub use project::{analyze_project, CarbonEquivalents, IntensityBenchmark, MaterialFamily, ProjectAnalysis};
pub use recommender::{recommend_alternatives, Recommendation};
pub use resolver::{resolve_material, MaterialQuery, Resolution};
