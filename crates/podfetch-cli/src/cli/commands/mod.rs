//! CLI command handlers. Each command is in its own file.

mod download;
mod episodes;
mod get;
mod history;
mod import;
mod status;

pub use download::run_download;
pub use episodes::run_episodes;
pub use get::run_get;
pub use history::run_history;
pub use import::run_import;
pub use status::run_status;

use podfetch_core::catalog::Catalog;
use podfetch_core::config::PodfetchConfig;
use podfetch_core::{CurlTransport, DownloadResult, FetchPipeline, StatusStore};
use std::sync::Arc;

/// Pipeline over the configured download dir, ledger and curl transport.
fn build_pipeline(cfg: &PodfetchConfig) -> FetchPipeline {
    let store = Arc::new(StatusStore::open(cfg.status_path()));
    let transport = Arc::new(CurlTransport::from_config(cfg));
    FetchPipeline::new(store, transport, cfg.download_dir.clone())
}

/// Tells the user when ledger writes failed: those downloads may repeat after a restart.
fn warn_if_ledger_degraded(store: &StatusStore) {
    let failures = store.persist_failures();
    if failures > 0 {
        eprintln!(
            "warning: {} ledger write(s) to {} failed; those episodes may be downloaded again next run",
            failures,
            store.path().display()
        );
    }
}

/// Flags successful downloads in the catalog. The catalog is informational,
/// so an unavailable database only logs a warning.
async fn record_in_catalog(results: &[DownloadResult]) {
    if !results.iter().any(DownloadResult::is_success) {
        return;
    }
    let catalog = match Catalog::open_default().await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("catalog unavailable, download state not recorded: {:#}", e);
            return;
        }
    };
    match catalog.record_downloads(results).await {
        Ok(n) => tracing::debug!("catalog: marked {} episode(s) downloaded", n),
        Err(e) => tracing::warn!("catalog update failed: {:#}", e),
    }
}
