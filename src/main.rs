// =============================================================================
// alphaprofile — Command-line entry point
// =============================================================================
//
//   alphaprofile profile --data <dir> --out <dir> [--horizon 1s] [--config f]
//   alphaprofile select  --summary <csv> --out <csv> [--config f]
// =============================================================================

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use alphaprofile::config::{ProfileConfig, SelectionConfig};
use alphaprofile::forward::parse_horizon;
use alphaprofile::{loader, profile, report, selection};

#[derive(Parser, Debug)]
#[command(name = "alphaprofile", about = "Profile and rank order-book alphas", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Profile alpha versions
    Profile {
        /// Directory of *.bn.ob.archive files
        #[arg(long, env = "ALPHAPROFILE_DATA")]
        data: PathBuf,

        /// Output directory
        #[arg(long)]
        out: PathBuf,

        /// Forward horizon (e.g. 1s, 5s); overrides the config file
        #[arg(long)]
        horizon: Option<String>,

        /// JSON profile config
        #[arg(long, env = "ALPHAPROFILE_PROFILE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Select the best alpha from a summary table
    Select {
        /// Summary CSV written by `profile`
        #[arg(long)]
        summary: PathBuf,

        /// Output path for the ranked CSV
        #[arg(long)]
        out: PathBuf,

        /// JSON selection config (constraints, weights)
        #[arg(long, env = "ALPHAPROFILE_SELECTION_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Profile {
            data,
            out,
            horizon,
            config,
        } => {
            let mut config = match config {
                Some(path) => ProfileConfig::load(path)?,
                None => ProfileConfig::default(),
            };
            if let Some(raw) = horizon {
                config.horizon = parse_horizon(&raw)?;
            }

            let files = loader::list_archive_files(&data)?;
            if files.is_empty() {
                warn!(path = %data.display(), "no archive files found");
            }
            let dataset = loader::load_archives(&files)?;
            let result = profile::run_profile(&dataset, None, &config)
                .context("profiling failed")?;
            report::write_profile(&result, &out)?;

            info!(
                alphas = result.summary.len(),
                best = ?result.summary.first().map(|r| &r.alpha),
                "profile complete"
            );
        }
        Commands::Select {
            summary,
            out,
            config,
        } => {
            let config = match config {
                Some(path) => SelectionConfig::load(path)?,
                None => SelectionConfig::default(),
            };
            if !summary.is_file() {
                bail!("summary {} does not exist", summary.display());
            }

            let rows = report::read_summary_csv(&summary)?;
            let ranked = selection::select_best(&rows, &config);
            report::write_summary_csv(&ranked, &out)?;

            info!(
                candidates = rows.len(),
                selected = ranked.len(),
                path = %out.display(),
                "selection written"
            );
        }
    }

    Ok(())
}
