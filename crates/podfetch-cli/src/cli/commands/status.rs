//! `podfetch status [url]` – show the download ledger.

use anyhow::Result;
use podfetch_core::config::PodfetchConfig;
use podfetch_core::StatusStore;

pub fn run_status(cfg: &PodfetchConfig, url: Option<&str>) -> Result<()> {
    let store = StatusStore::open(cfg.status_path());
    if let Some(url) = url {
        println!("{}", store.is_downloaded(url));
        return Ok(());
    }

    let ledger = store.snapshot();
    if ledger.is_empty() {
        println!("No downloads recorded in {}.", store.path().display());
    } else {
        println!("{:<12} {}", "DOWNLOADED", "URL");
        for (url, done) in ledger {
            println!("{:<12} {}", if done { "yes" } else { "no" }, url);
        }
    }
    Ok(())
}
