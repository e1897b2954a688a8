use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use xplane_navdata::{ManagerConfig, NavDataManager};

#[derive(Parser)]
#[command(name = "xplane-navdata")]
#[command(about = "Load and query X-Plane navigation data", long_about = None)]
struct Cli {
    /// JSON file with manager settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load everything and print the load status
    Status {
        #[arg(short, long)]
        root: PathBuf,
    },

    /// Records within a radius of a position
    Nearby {
        #[arg(short, long)]
        root: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[arg(long, default_value = "25")]
        radius: f64,

        #[arg(short, long, value_enum, default_value = "navaids")]
        kind: NearbyKind,
    },

    /// Free-text search over navaids and waypoints
    Search {
        #[arg(short, long)]
        root: PathBuf,

        query: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Resolved SIDs, STARs and approaches for one airport
    Procedures {
        #[arg(short, long)]
        root: PathBuf,

        icao: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum NearbyKind {
    Navaids,
    Waypoints,
    Airways,
    ApproachAids,
    Airspaces,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn load(config: ManagerConfig, root: &Path) -> Result<NavDataManager> {
    let manager = NavDataManager::new(config);
    manager
        .load_all(root)
        .await
        .with_context(|| format!("Failed to load dataset at {}", root.display()))?;
    Ok(manager)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ManagerConfig::load(path)?,
        None => ManagerConfig::default(),
    };

    match cli.command {
        Commands::Status { root } => {
            let manager = load(config, &root).await?;
            print_json(&manager.status())?;
        }

        Commands::Nearby { root, lat, lon, radius, kind } => {
            let manager = load(config, &root).await?;
            match kind {
                NearbyKind::Navaids => print_json(&manager.navaids_in_radius(lat, lon, radius, None)?)?,
                NearbyKind::Waypoints => print_json(&manager.waypoints_in_radius(lat, lon, radius)?)?,
                NearbyKind::Airways => print_json(&manager.airways_in_radius(lat, lon, radius)?)?,
                NearbyKind::ApproachAids => {
                    print_json(&manager.approach_aids_in_radius(lat, lon, radius)?)?
                }
                NearbyKind::Airspaces => print_json(&manager.airspaces_in_radius(lat, lon, radius)?)?,
            }
        }

        Commands::Search { root, query, limit } => {
            let manager = load(config, &root).await?;
            let results = manager.search(&query, limit)?;
            info!("{} results for {:?}", results.len(), query);
            print_json(&results)?;
        }

        Commands::Procedures { root, icao } => {
            let manager = load(config, &root).await?;
            let procedures = manager.procedures_for_airport(&icao).await?;
            print_json(&procedures)?;
        }
    }

    Ok(())
}
