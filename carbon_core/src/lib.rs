//! # carbon_core - Embodied Carbon Calculation Engine
//!
//! `carbon_core` computes the embodied carbon of a bill of materials against
//! cached reference data: it resolves loose material references, reconciles
//! units, applies EN 15804 lifecycle-stage factors and transport emission
//! factors, benchmarks each material against its category, and recommends
//! lower-carbon substitutes with projected savings. All inputs and outputs
//! are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Each request loads its own catalog snapshot; nothing is
//!   cached between requests
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Never partial**: A bad request or an unreadable catalog fails the
//!   whole calculation; an unknown material does not
//!
//! ## Quick Start
//!
//! ```rust
//! use carbon_core::calculations::{calculate_portfolio, CarbonRequest, LineItem};
//! use carbon_core::settings::EngineSettings;
//! use carbon_core::store::InMemoryStore;
//!
//! # tokio_test_block_on(async {
//! let store = InMemoryStore::seeded()?;
//! let request = CarbonRequest::new(vec![
//!     LineItem::by_category("Concrete", 50.0, "m³").with_transport("truck", 80.0),
//!     LineItem::by_id("steel-rebar", 12_000.0, "kg"),
//! ]);
//!
//! let report = calculate_portfolio(&store, &request, &EngineSettings::default()).await?;
//! println!("{} kg CO2e", report.summary.total_carbon);
//! # Ok::<(), carbon_core::CarbonError>(())
//! # }).unwrap();
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Resolver, conversion, lifecycle/transport carbon,
//!   benchmarks, alternatives, the portfolio aggregator, and project analysis
//! - [`catalog`] - Reference record types, built-in dataset, bundles, snapshots
//! - [`store`] - The async reference data store boundary
//! - [`envelope`] - `{success, data, meta}` response envelope
//! - [`settings`] - Engine defaults
//! - [`units`] - Type-safe unit wrappers and unit-label helpers
//! - [`errors`] - Structured error types
//! - [`file_io`] - Bundle, report and settings files with atomic saves and locking

pub mod calculations;
pub mod catalog;
pub mod envelope;
pub mod errors;
pub mod file_io;
pub mod settings;
pub mod store;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate_portfolio, calculate_with_snapshot, CarbonReport, CarbonRequest, LineItem};
pub use catalog::{CatalogSnapshot, Material};
pub use envelope::{ApiEnvelope, ApiResponse};
pub use errors::{CarbonError, CarbonResult};
pub use file_io::{load_catalog_bundle, save_catalog_bundle, save_report};
pub use settings::EngineSettings;
pub use store::{BundleStore, InMemoryStore, ReferenceStore};
