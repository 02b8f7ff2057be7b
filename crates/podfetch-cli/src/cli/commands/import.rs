//! `podfetch import` – load an episode list into the catalog.

use anyhow::Result;
use podfetch_core::catalog::Catalog;
use podfetch_core::config::PodfetchConfig;
use podfetch_core::episode_list;
use std::path::Path;

pub async fn run_import(
    catalog: &Catalog,
    cfg: &PodfetchConfig,
    list: Option<&Path>,
    podcast_url: Option<&str>,
    podcast_name: Option<&str>,
) -> Result<()> {
    let list_path = list
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cfg.snapshot_path());
    let items = episode_list::load(&list_path)?;
    if items.is_empty() {
        println!("No episodes in {}.", list_path.display());
        return Ok(());
    }

    let podcast_id = match podcast_url {
        Some(url) => Some(catalog.upsert_podcast(url, podcast_name.unwrap_or(url)).await?),
        None => None,
    };
    let count = catalog.import_items(&items, podcast_id).await?;
    println!("Imported {count} episode(s) from {}", list_path.display());
    Ok(())
}
