//! CLI for the podfetch episode downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use podfetch_core::catalog::Catalog;
use podfetch_core::config;
use std::path::PathBuf;

use commands::{run_download, run_episodes, run_get, run_history, run_import, run_status};

/// Top-level CLI for podfetch.
#[derive(Debug, Parser)]
#[command(name = "podfetch")]
#[command(about = "podfetch: concurrent podcast episode downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every episode in an episode list, skipping ones already downloaded.
    Download {
        /// Episode list to read (default: <download_dir>/podcast_links.txt).
        #[arg(long, value_name = "PATH")]
        list: Option<PathBuf>,
        /// Concurrent downloads (default: max_workers from config).
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
        /// Download again even if the ledger says done; never overwrites existing files.
        #[arg(long)]
        force: bool,
    },

    /// Download a single episode now.
    Get {
        /// Episode title (used for the filename).
        title: String,
        /// Direct audio URL.
        url: String,
        /// Download again even if the ledger says done.
        #[arg(long)]
        force: bool,
    },

    /// Show the download ledger, or whether one URL has been downloaded.
    Status {
        /// Audio URL to check.
        url: Option<String>,
    },

    /// Import an episode list into the catalog.
    Import {
        /// Episode list to read (default: <download_dir>/podcast_links.txt).
        #[arg(long, value_name = "PATH")]
        list: Option<PathBuf>,
        /// Listing page the episodes came from.
        #[arg(long, value_name = "URL")]
        podcast_url: Option<String>,
        /// Display name for the podcast (default: its URL).
        #[arg(long, value_name = "NAME", requires = "podcast_url")]
        podcast_name: Option<String>,
    },

    /// List episodes in the catalog.
    Episodes,

    /// Show catalog episodes grouped by podcast, with what has been downloaded.
    History,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Download {
                list,
                workers,
                force,
            } => run_download(&cfg, list.as_deref(), workers, force).await?,
            CliCommand::Get { title, url, force } => run_get(&cfg, title, url, force).await?,
            CliCommand::Status { url } => run_status(&cfg, url.as_deref())?,
            CliCommand::Import {
                list,
                podcast_url,
                podcast_name,
            } => {
                let catalog = Catalog::open_default().await?;
                run_import(
                    &catalog,
                    &cfg,
                    list.as_deref(),
                    podcast_url.as_deref(),
                    podcast_name.as_deref(),
                )
                .await?;
            }
            CliCommand::Episodes => {
                let catalog = Catalog::open_default().await?;
                run_episodes(&catalog).await?;
            }
            CliCommand::History => {
                let catalog = Catalog::open_default().await?;
                run_history(&catalog).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
