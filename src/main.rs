pub mod types;
pub mod config;
pub mod crs;
pub mod fetch;
pub mod data;
pub mod analysis;

use crate::types::{
    format_area_ha, DatasetKind, ZoneSummary, COL_AREA_HA, COL_COUNT, COL_LOCALITY, COL_ZONE_ID,
    COL_ZONE_NAME,
};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count occupation events inside each monitoring zone
    Analyze {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Only analyze zones in these localities (repeatable)
        #[arg(short, long)]
        locality: Vec<String>,
        /// Only analyze the zone with exactly this name
        #[arg(short = 'n', long)]
        zone_name: Option<String>,
    },
    /// Show the column layout and extent of one dataset
    Inspect {
        dataset: DatasetArg,
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DatasetArg {
    Zones,
    Occupations,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Analyze {
            config,
            locality,
            zone_name,
        } => {
            let app_config = config::Config::load_from_file(config)?;
            let mut cache = fetch::DatasetCache::new();

            // 1. Load Datasets
            let zones = cache
                .get_or_load(&app_config.datasets.zones_url, DatasetKind::Zones)
                .with_context(|| {
                    format!("Failed to load zones from {}", app_config.datasets.zones_url)
                })?
                .clone();
            let occupations = cache
                .get_or_load(
                    &app_config.datasets.occupations_url,
                    DatasetKind::Occupations,
                )
                .with_context(|| {
                    format!(
                        "Failed to load occupations from {}",
                        app_config.datasets.occupations_url
                    )
                })?
                .clone();

            // 2. Filter Zones
            let filter = analysis::ZoneFilter::new(locality, zone_name.as_deref());
            let zones = filter.filter_table(&zones);
            if !filter.is_empty() {
                println!("Filter keeps {} of the loaded zones", zones.len());
            }
            if zones.is_empty() {
                println!("No zones match the applied filters");
                return Ok(());
            }

            // 3. Aggregate
            let summaries = analysis::aggregate(&zones, &occupations)
                .context("Failed to aggregate occupations")?;

            // 4. Print Summary
            print_summaries(&summaries);
        }
        Commands::Inspect { dataset, config } => {
            let app_config = config::Config::load_from_file(config)?;
            let (url, kind) = match dataset {
                DatasetArg::Zones => (&app_config.datasets.zones_url, DatasetKind::Zones),
                DatasetArg::Occupations => (
                    &app_config.datasets.occupations_url,
                    DatasetKind::Occupations,
                ),
            };

            let mut cache = fetch::DatasetCache::new();
            let table = cache
                .get_or_load(url, kind)
                .with_context(|| format!("Failed to load dataset from {url}"))?;

            println!("{} features, EPSG:{}", table.len(), table.epsg);
            println!("Columns: {}", table.columns.join(", "));
            if let Some(bounds) = table.bounds() {
                println!(
                    "Extent: ({:.6}, {:.6}) to ({:.6}, {:.6})",
                    bounds.min().x,
                    bounds.min().y,
                    bounds.max().x,
                    bounds.max().y
                );
                let center = bounds.center();
                println!("Center: ({:.6}, {:.6})", center.x, center.y);
            }
        }
    }

    Ok(())
}

fn print_summaries(summaries: &[ZoneSummary]) {
    println!(
        "{:<12} {:<28} {:<18} {:>22} {:>22}",
        COL_ZONE_ID, COL_ZONE_NAME, COL_LOCALITY, COL_AREA_HA, COL_COUNT
    );
    for zone in summaries {
        println!(
            "{:<12} {:<28} {:<18} {:>22} {:>22}",
            zone.id,
            zone.name,
            zone.locality,
            format_area_ha(zone.area_ha),
            zone.occupations
        );
    }

    let total_occupations: u64 = summaries.iter().map(|z| z.occupations).sum();
    let total_area: f64 = summaries.iter().map(|z| z.area_ha).sum();
    println!(
        "{} zones, {} occupations, total area {}",
        summaries.len(),
        total_occupations,
        format_area_ha(total_area)
    );
}
