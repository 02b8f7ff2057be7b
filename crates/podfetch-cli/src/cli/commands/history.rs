//! `podfetch history` – episodes grouped by podcast, with download state.

use anyhow::Result;
use podfetch_core::catalog::Catalog;

pub async fn run_history(catalog: &Catalog) -> Result<()> {
    let history = catalog.podcast_history().await?;
    if history.is_empty() {
        println!("No podcasts in catalog.");
        return Ok(());
    }
    for group in history {
        println!(
            "{} ({}) - {}/{} downloaded",
            group.podcast.name,
            group.podcast.url,
            group.downloaded_count(),
            group.episodes.len()
        );
        for e in &group.episodes {
            let mark = if e.downloaded { "x" } else { " " };
            match &e.download_path {
                Some(path) if e.downloaded => println!("  [{mark}] {}  -> {}", e.title, path),
                _ => println!("  [{mark}] {}  {}", e.title, e.url),
            }
        }
    }
    Ok(())
}
