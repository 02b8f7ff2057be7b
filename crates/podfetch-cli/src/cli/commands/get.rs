//! `podfetch get <title> <url>` – download one episode now.

use anyhow::{Context, Result};
use podfetch_core::config::PodfetchConfig;
use podfetch_core::DownloadItem;

use super::{build_pipeline, record_in_catalog, warn_if_ledger_degraded};

pub async fn run_get(cfg: &PodfetchConfig, title: String, url: String, force: bool) -> Result<()> {
    let item = DownloadItem::new(title, url);
    let pipeline = build_pipeline(cfg);
    let result = tokio::task::spawn_blocking({
        let pipeline = pipeline.clone();
        move || pipeline.download_one(&item, force)
    })
    .await
    .context("download task join")?;

    println!("{result}");
    warn_if_ledger_degraded(pipeline.store());
    if result.is_failed() {
        anyhow::bail!("download of '{}' failed", result.title);
    }
    if let Some(path) = &result.path {
        println!("saved to {}", path.display());
    }
    record_in_catalog(std::slice::from_ref(&result)).await;
    Ok(())
}
