//! `podfetch download` – run a batch over an episode list.

use anyhow::{Context, Result};
use podfetch_core::config::PodfetchConfig;
use podfetch_core::episode_list;
use podfetch_core::item::BatchSummary;
use std::path::Path;

use super::{build_pipeline, record_in_catalog, warn_if_ledger_degraded};

pub async fn run_download(
    cfg: &PodfetchConfig,
    list: Option<&Path>,
    workers: Option<usize>,
    force: bool,
) -> Result<()> {
    let list_path = list
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cfg.snapshot_path());
    let mut items = episode_list::load(&list_path)?;
    if items.is_empty() {
        println!("No episodes in {}.", list_path.display());
        return Ok(());
    }
    if cfg.test_mode && items.len() > cfg.test_batch_size {
        tracing::info!(
            "test mode: keeping {} of {} episodes",
            cfg.test_batch_size,
            items.len()
        );
        items.truncate(cfg.test_batch_size);
    }

    let workers = cfg.effective_workers(workers);
    let pipeline = build_pipeline(cfg);
    let results = tokio::task::spawn_blocking({
        let pipeline = pipeline.clone();
        move || pipeline.download_batch(items, workers, force)
    })
    .await
    .context("download task join")?;

    for r in &results {
        println!("{r}");
    }
    let summary = BatchSummary::from_results(&results);
    println!(
        "{} downloaded, {} skipped, {} failed",
        summary.succeeded, summary.skipped, summary.failed
    );
    tracing::info!(
        succeeded = summary.succeeded,
        skipped = summary.skipped,
        failed = summary.failed,
        "batch finished"
    );
    warn_if_ledger_degraded(pipeline.store());
    record_in_catalog(&results).await;
    Ok(())
}
