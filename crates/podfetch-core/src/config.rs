use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::episode_list;
use crate::status_store::STATUS_FILE_NAME;

/// Global configuration loaded from `~/.config/podfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodfetchConfig {
    /// Directory for audio files, the download ledger and the episode list snapshot.
    pub download_dir: PathBuf,
    /// Default number of concurrent download workers per batch.
    pub max_workers: usize,
    /// Connect and stall timeout for a single retrieval attempt, in seconds.
    pub request_timeout_secs: u64,
    /// Upper bound on one whole transfer, in seconds. 0 disables the cap.
    #[serde(default = "default_transfer_timeout_secs")]
    pub transfer_timeout_secs: u64,
    /// Truncate CLI batches to `test_batch_size` items.
    #[serde(default)]
    pub test_mode: bool,
    /// Number of items kept per batch when `test_mode` is on.
    #[serde(default = "default_test_batch_size")]
    pub test_batch_size: usize,
    /// Optional User-Agent override (None = built-in browser string).
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_test_batch_size() -> usize {
    3
}

fn default_transfer_timeout_secs() -> u64 {
    3600
}

impl Default for PodfetchConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("download"),
            max_workers: 3,
            request_timeout_secs: 30,
            transfer_timeout_secs: default_transfer_timeout_secs(),
            test_mode: false,
            test_batch_size: default_test_batch_size(),
            user_agent: None,
        }
    }
}

impl PodfetchConfig {
    /// Ledger file: `<download_dir>/download_status.json`.
    pub fn status_path(&self) -> PathBuf {
        self.download_dir.join(STATUS_FILE_NAME)
    }

    /// Episode list snapshot: `<download_dir>/podcast_links.txt`.
    pub fn snapshot_path(&self) -> PathBuf {
        episode_list::default_path(&self.download_dir)
    }

    /// Worker count actually used for a batch (never zero).
    pub fn effective_workers(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.max_workers).max(1)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("podfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PodfetchConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<PodfetchConfig> {
    if !path.exists() {
        let default_cfg = PodfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: PodfetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
