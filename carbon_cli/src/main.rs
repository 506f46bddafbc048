//! # Carbon CLI
//!
//! Command-line front end for `carbon_core`. Runs portfolio calculations
//! from a JSON bill of materials, converts units, identifies EPD numbers,
//! and exports the built-in reference catalog as a bundle file.
//!
//! Logging goes to stderr and is controlled by `CARBON_LOG`
//! (e.g. `CARBON_LOG=debug`); the default level is `warn`.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use carbon_core::calculations::{
    calculate_portfolio, convert_units, CarbonReport, CarbonRequest, ConversionRequest, ConversionResult,
    ItemStatus, ProjectAnalysis,
};
use carbon_core::catalog::{builtin_catalog, validate_epd_number, CatalogSnapshot, LoadOptions};
use carbon_core::envelope::{ApiError, ApiResponse};
use carbon_core::file_io::{load_request, load_settings, save_catalog_bundle, save_report};
use carbon_core::settings::EngineSettings;
use carbon_core::store::{BundleStore, FindQuery, InMemoryStore, ReferenceStore};
use carbon_core::CarbonResult;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Embodied carbon calculator.
#[derive(Parser)]
#[command(name = "carbon", version, about = "Embodied carbon calculator")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    format: OutputFormat,

    /// Engine settings JSON file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the embodied carbon of a bill of materials
    Calculate {
        /// Path to the request JSON file
        request: PathBuf,
        /// Catalog bundle to use instead of the built-in reference data
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Save the report to this file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Building type for the intensity benchmark (overrides the request)
        #[arg(long)]
        building_type: Option<String>,
        /// Gross floor area in square feet (overrides the request)
        #[arg(long)]
        square_footage: Option<f64>,
    },

    /// Convert a quantity between units for a material category
    Convert {
        quantity: f64,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        category: String,
        /// Material type within the category (e.g. "Lightweight")
        #[arg(long = "type")]
        material_type: Option<String>,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Identify the program that issued an EPD number
    Epd {
        number: String,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Write the built-in reference catalog to a bundle file
    ExportCatalog {
        /// Destination (conventionally *.carbon.json)
        file: PathBuf,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start async runtime: {}", e);
            process::exit(1);
        }
    };

    let result = runtime.block_on(run(cli));
    if let Err(e) = result {
        eprintln!("error: {}", e);
        if let Ok(json) = serde_json::to_string_pretty(&ApiError::from(&e)) {
            eprintln!("{}", json);
        }
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CARBON_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> CarbonResult<()> {
    let settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => EngineSettings::default(),
    };

    match cli.command {
        Commands::Calculate {
            request,
            catalog,
            output,
            building_type,
            square_footage,
        } => {
            let building = BuildingProfile {
                building_type,
                square_footage,
            };
            cmd_calculate(
                &request,
                catalog.as_deref(),
                output.as_deref(),
                &building,
                &settings,
                cli.format,
            )
            .await
        }
        Commands::Convert {
            quantity,
            from,
            to,
            category,
            material_type,
            catalog,
        } => {
            let request = ConversionRequest {
                quantity,
                from_unit: from,
                to_unit: to,
                material_category: category,
                material_type,
            };
            cmd_convert(&request, catalog.as_deref(), &settings, cli.format).await
        }
        Commands::Epd { number, catalog } => cmd_epd(&number, catalog.as_deref(), cli.format).await,
        Commands::ExportCatalog { file } => cmd_export_catalog(&file),
    }
}

/// The store a command reads from: a bundle file, or the built-in data
fn open_store(catalog: Option<&Path>) -> CarbonResult<Box<dyn ReferenceStore>> {
    Ok(match catalog {
        Some(path) => Box::new(BundleStore::new(path)),
        None => Box::new(InMemoryStore::seeded()?),
    })
}

fn print_json<T: Serialize>(value: &T) -> CarbonResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Building fields given on the command line
#[derive(Debug, Default)]
struct BuildingProfile {
    building_type: Option<String>,
    square_footage: Option<f64>,
}

impl BuildingProfile {
    fn apply(&self, request: &mut CarbonRequest) {
        if let Some(kind) = &self.building_type {
            request.building_type = Some(kind.clone());
        }
        if let Some(area) = self.square_footage {
            request.square_footage = Some(area);
        }
    }
}

async fn cmd_calculate(
    request_path: &Path,
    catalog: Option<&Path>,
    output: Option<&Path>,
    building: &BuildingProfile,
    settings: &EngineSettings,
    format: OutputFormat,
) -> CarbonResult<()> {
    let mut request = load_request(request_path)?;
    building.apply(&mut request);
    let store = open_store(catalog)?;
    let report = calculate_portfolio(store.as_ref(), &request, settings).await?;

    if let Some(path) = output {
        save_report(&report, path)?;
        info!(path = %path.display(), "report saved");
    }

    match format {
        OutputFormat::Json => print_json(&ApiResponse::from_result(Ok(report), &settings.data_version)),
        OutputFormat::Text => {
            print_report(&report);
            if let Some(path) = output {
                println!();
                println!("Report saved to {}", path.display());
            }
            Ok(())
        }
    }
}

fn print_report(report: &CarbonReport) {
    println!("Embodied Carbon Report ({}, {})", report.region, report.country);
    println!("{}", "=".repeat(96));
    println!(
        "{:<36} {:>18} {:>16} {:>12} {:>10}",
        "Material", "Quantity", "Embodied", "Transport", "vs Avg"
    );
    println!("{}", "-".repeat(96));

    for item in &report.materials {
        let name = match item.status {
            ItemStatus::Resolved => item.material.name.clone(),
            ItemStatus::Unresolved => format!("{} (not found)", item.material.name),
        };
        let quantity = match (&item.input.converted_quantity, &item.input.converted_unit) {
            (Some(q), Some(u)) => format!("{} {}", q, u),
            _ => format!("{} {}", item.input.quantity, item.input.unit),
        };
        let transport = item
            .transport
            .as_ref()
            .map(|t| format!("{:.2}", t.emissions))
            .unwrap_or_else(|| "-".to_string());
        let vs_avg = item
            .benchmarks
            .map(|b| format!("{:+}%", b.vs_industry_avg))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<36} {:>18} {:>16.2} {:>12} {:>10}",
            truncate(&name, 36),
            quantity,
            item.embodied_carbon.total,
            transport,
            vs_avg
        );

        if let Some(alternatives) = &item.alternatives {
            for alt in alternatives {
                println!(
                    "    alt: {:<40} -{}%  saves {:.2} {}",
                    truncate(&alt.name, 40),
                    alt.reduction,
                    alt.potential_savings,
                    item.embodied_carbon.unit
                );
            }
        }
    }

    let summary = &report.summary;
    println!("{}", "-".repeat(96));
    println!("Embodied:  {:>14.2} {}", summary.total_embodied_carbon, summary.unit);
    println!("Transport: {:>14.2} {}", summary.total_transport_carbon, summary.unit);
    println!("Total:     {:>14.2} {}", summary.total_carbon, summary.unit);
    if summary.unresolved_count > 0 {
        println!(
            "{} of {} materials were not found in the catalog and count as zero.",
            summary.unresolved_count, summary.material_count
        );
    }

    if let Some(project) = &report.project {
        print_project(project, &summary.unit);
    }
}

fn print_project(project: &ProjectAnalysis, unit: &str) {
    println!();
    println!("Project");
    println!("{}", "-".repeat(96));
    if let Some(per_sq_ft) = project.carbon_per_sq_ft {
        println!("Intensity: {:>14.2} {}/sq ft", per_sq_ft, unit);
    }
    if let Some(bench) = &project.benchmark {
        println!(
            "Benchmark: {} (average {}, best in class {}), percentile {}",
            bench.building_type, bench.industry_average, bench.best_in_class, bench.percentile
        );
    }
    println!(
        "Saved:     {:>14.2} {} ({}% below baseline)",
        project.carbon_saved, unit, project.percent_reduction
    );
    println!("Available: {:>14.2} {} from catalog alternatives", project.potential_savings, unit);

    let eq = &project.equivalents;
    println!(
        "Equals:    {} tree-years, {} car miles, {} flight hours, {} home-years of energy",
        eq.trees, eq.car_miles, eq.flight_hours, eq.home_energy
    );

    println!();
    println!("Reduction tips:");
    for tip in &project.reduction_tips {
        println!("  - {}", tip);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}

async fn cmd_convert(
    request: &ConversionRequest,
    catalog: Option<&Path>,
    settings: &EngineSettings,
    format: OutputFormat,
) -> CarbonResult<()> {
    let store = open_store(catalog)?;
    let snapshot = CatalogSnapshot::load(
        store.as_ref(),
        LoadOptions {
            include_alternatives: false,
        },
    )
    .await?;
    let result: ConversionResult = convert_units(&snapshot, request)?;

    match format {
        OutputFormat::Json => print_json(&ApiResponse::from_result(Ok(result), &settings.data_version)),
        OutputFormat::Text => {
            println!(
                "{} {} = {} {}",
                result.quantity, result.from_unit, result.converted_quantity, result.to_unit
            );
            println!("factor: {} ({:?})", result.factor, result.method);
            if let Some(notes) = &result.notes {
                println!("notes:  {}", notes);
            }
            Ok(())
        }
    }
}

async fn cmd_epd(number: &str, catalog: Option<&Path>, format: OutputFormat) -> CarbonResult<()> {
    let store = open_store(catalog)?;
    let programs = store.find_epd_programs(&FindQuery::active()).await?;
    let program = validate_epd_number(&programs, number)?;

    match format {
        OutputFormat::Json => print_json(program),
        OutputFormat::Text => {
            println!("{} was issued under {}", number.trim(), program.label());
            if let Some(url) = program.registry_url.as_deref().or(program.website.as_deref()) {
                println!("registry: {}", url);
            }
            Ok(())
        }
    }
}

fn cmd_export_catalog(file: &Path) -> CarbonResult<()> {
    let mut bundle = builtin_catalog()?.clone();
    bundle.touch();
    save_catalog_bundle(&bundle, file)?;
    println!("Wrote {} records to {}", bundle.record_count(), file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbon_core::CarbonError;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from([
            "carbon", "convert", "2.5", "--from", "m³", "--to", "kg", "--category", "Concrete",
        ])
        .unwrap();
        match cli.command {
            Commands::Convert { quantity, from, .. } => {
                assert_eq!(quantity, 2.5);
                assert_eq!(from, "m³");
            }
            _ => panic!("expected convert"),
        }
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_parse_calculate_building_flags() {
        let cli = Cli::try_parse_from([
            "carbon",
            "calculate",
            "bom.json",
            "--building-type",
            "office",
            "--square-footage",
            "20000",
        ])
        .unwrap();
        match cli.command {
            Commands::Calculate {
                building_type,
                square_footage,
                ..
            } => {
                assert_eq!(building_type.as_deref(), Some("office"));
                assert_eq!(square_footage, Some(20000.0));
            }
            _ => panic!("expected calculate"),
        }
    }

    #[test]
    fn test_building_profile_overrides_request() {
        let mut request = CarbonRequest::new(vec![]).with_building("retail", 500.0);
        BuildingProfile {
            building_type: None,
            square_footage: Some(800.0),
        }
        .apply(&mut request);
        assert_eq!(request.building_type.as_deref(), Some("retail"));
        assert_eq!(request.square_footage, Some(800.0));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Concrete", 36), "Concrete");
        assert_eq!(truncate("Cross-Laminated Timber (CLT)", 10), "Cross-L...");
    }

    #[tokio::test]
    async fn test_epd_lookup_against_builtin() {
        assert!(cmd_epd("S-P-01234", None, OutputFormat::Json).await.is_ok());
        let err = cmd_epd("ZZZ-1", None, OutputFormat::Text).await.unwrap_err();
        assert!(matches!(err, CarbonError::NotFound { .. }));
    }
}
