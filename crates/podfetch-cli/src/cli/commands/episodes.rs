//! `podfetch episodes` – list catalog episodes.

use anyhow::Result;
use podfetch_core::catalog::Catalog;

pub async fn run_episodes(catalog: &Catalog) -> Result<()> {
    let episodes = catalog.list_episodes().await?;
    if episodes.is_empty() {
        println!("No episodes in catalog.");
    } else {
        println!("{:<6} {:<4} {:<20} {:<40} {}", "ID", "DL", "PODCAST", "TITLE", "URL");
        for e in episodes {
            println!(
                "{:<6} {:<4} {:<20} {:<40} {}",
                e.id,
                if e.downloaded { "yes" } else { "no" },
                e.podcast_name.as_deref().unwrap_or("-"),
                e.title,
                e.url
            );
        }
    }
    Ok(())
}
