//! zpa-ingest - dataset builder
//!
//! Runs the CSV → census → snapshot pipeline and the area-name update pass.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use zpa_common::config::{ReferenceSourceConfig, ZpaConfig};
use zpa_common::DatasetStore;
use zpa_ingest::area_names::{update_snapshot, AreaNameResolver};
use zpa_ingest::{ensure_dataset, DatasetSource, Pipeline};

/// Command-line arguments for zpa-ingest
#[derive(Parser, Debug)]
#[command(name = "zpa-ingest")]
#[command(about = "Build and enrich the ZIP penetration dataset")]
#[command(version)]
struct Cli {
    /// Config file (overrides ZPA_CONFIG and ./zpa.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline and write the snapshot
    Process {
        /// Rebuild even when a snapshot already exists
        #[arg(long)]
        force: bool,
    },

    /// Re-resolve area names in the stored snapshot
    UpdateAreaNames {
        /// Reference file as FORMAT:PATH[:CROSSWALK]; replaces the configured list
        #[arg(long = "reference", value_name = "FORMAT:PATH[:CROSSWALK]")]
        references: Vec<ReferenceSourceConfig>,
    },

    /// Print the area name each ZIP resolves to
    Resolve {
        #[arg(required = true)]
        zip_codes: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ZpaConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    let store = DatasetStore::new(&config.snapshot_path);

    match cli.command {
        Command::Process { force } => {
            let records = if force {
                info!(csv = %config.data_csv.display(), "Forced rebuild from CSV");
                Pipeline::from_config(&config)?
                    .run_file(&config.data_csv)
                    .await
                    .with_context(|| format!("Failed to process {}", config.data_csv.display()))?
            } else {
                let (records, source) = ensure_dataset(&config, &store)
                    .await
                    .context("Failed to build dataset")?;
                if source == DatasetSource::Snapshot {
                    info!("Snapshot already exists; use --force to rebuild");
                    return Ok(());
                }
                records
            };

            store
                .save(&records)
                .with_context(|| format!("Failed to write {}", store.path().display()))?;
            info!(
                path = %store.path().display(),
                "Saved {} records",
                records.len()
            );
        }

        Command::UpdateAreaNames { references } => {
            if !references.is_empty() {
                config.area_names.reference = references;
            }
            let resolver = AreaNameResolver::from_config(&config.area_names)
                .context("Failed to load area-name sources")?;
            let summary = update_snapshot(&store, &resolver)
                .with_context(|| format!("Failed to update {}", store.path().display()))?;
            println!(
                "Updated {} of {} records ({} resolved, {} unknown)",
                summary.changed, summary.total, summary.resolved, summary.placeholders
            );
        }

        Command::Resolve { zip_codes } => {
            let resolver = AreaNameResolver::from_config(&config.area_names)
                .context("Failed to load area-name sources")?;
            for zip in &zip_codes {
                match resolver.resolve(zip) {
                    Some(resolution) => {
                        println!("{}\t{}\t({})", zip, resolution.area_name, resolution.source)
                    }
                    None => println!("{}\t{}", zip, zpa_common::AREA_NAME_PLACEHOLDER),
                }
            }
        }
    }

    Ok(())
}
