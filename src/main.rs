// Energy Atlas - CLI
// Loads the JSON resources from the data directory and prints views as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use energy_atlas::{DirectoryFetcher, EnergyStore, EngineConfig, ViewName, Year};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

/// Command-line arguments for energy-atlas
#[derive(Parser, Debug)]
#[command(name = "energy-atlas")]
#[command(about = "Normalize the energy atlas datasets and print views as JSON")]
#[command(version)]
struct Cli {
    /// Directory holding the JSON resources (overrides env and config file)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load status, dataset version and metadata
    Summary,
    /// Countries of the dependency source, sorted by name
    Countries,
    /// Print one view for a (country, year) selection
    View {
        /// dependency, trade, production-consumption, sectors, hierarchy, prices,
        /// carbon-ranking or emissions-ranking
        name: ViewName,

        /// Alpha-2 country code (defaults to the configured country)
        #[arg(short, long)]
        country: Option<String>,

        /// Year (defaults to the configured year)
        #[arg(short, long)]
        year: Option<Year>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = EngineConfig::resolve(cli.data_dir.as_deref())
        .context("Failed to resolve configuration")?;
    info!("Data directory: {}", config.data_dir.display());

    let store = EnergyStore::from_config(&config);
    let fetcher = DirectoryFetcher::new(&config.data_dir);
    store
        .load(&fetcher)
        .with_context(|| format!("Failed to load datasets from {}", config.data_dir.display()))?;

    let output = match cli.command {
        Command::Summary => json!({
            "version": energy_atlas::VERSION,
            "status": store.snapshot_status(),
            "metadata": store.metadata(),
            "generated_at": store.metadata().and_then(|m| m.generated_at()),
        }),
        Command::Countries => serde_json::to_value(store.countries())?,
        Command::View { name, country, year } => {
            if let Some(year) = year {
                if !config.year_range.contains(year) {
                    warn!(
                        year,
                        min = config.year_range.min,
                        max = config.year_range.max,
                        "year outside the configured range"
                    );
                }
            }
            store.update_selection(country.as_deref(), year);

            let view = store
                .view_json(name)
                .with_context(|| format!("Failed to serialize view {}", name))?;
            json!({
                "view": name.as_str(),
                "selection": store.selection(),
                "available_years": store.available_years(),
                "data": view,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
