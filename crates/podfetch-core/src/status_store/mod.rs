//! Persistent "already downloaded" ledger.
//!
//! Maps a source URL to `true` once a download of it has been written to disk.
//! The whole ledger is loaded when the store is opened and rewritten after every
//! mark, so a crash loses at most the mark that was being persisted. The store
//! is shared by all pipeline workers; one mutex covers merge and persist.

mod persist;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Ledger file name inside the download directory.
pub const STATUS_FILE_NAME: &str = "download_status.json";

/// In-memory ledger backed by a JSON file.
#[derive(Debug)]
pub struct StatusStore {
    path: PathBuf,
    ledger: Mutex<BTreeMap<String, bool>>,
    persist_failures: AtomicU64,
}

impl StatusStore {
    /// Opens the ledger at `path`. A missing or unreadable file gives an empty ledger.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ledger = match persist::load(&path) {
            Ok(Some(ledger)) => {
                tracing::debug!(entries = ledger.len(), "loaded ledger from {}", path.display());
                ledger
            }
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("could not load ledger, starting empty: {:#}", e);
                BTreeMap::new()
            }
        };
        Self {
            path,
            ledger: Mutex::new(ledger),
            persist_failures: AtomicU64::new(0),
        }
    }

    /// Opens `<download_dir>/download_status.json`.
    pub fn open_in(download_dir: &Path) -> Self {
        Self::open(download_dir.join(STATUS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if a previous download of `url` was confirmed. Unknown URLs are `false`.
    pub fn is_downloaded(&self, url: &str) -> bool {
        self.lock().get(url).copied().unwrap_or(false)
    }

    /// Records `url` as downloaded and rewrites the ledger file.
    ///
    /// A failed write is logged and counted, not returned: the in-memory mark
    /// holds for the rest of the process either way.
    pub fn mark_downloaded(&self, url: &str) {
        let mut ledger = self.lock();
        ledger.insert(url.to_string(), true);
        if let Err(e) = persist::save(&self.path, &ledger) {
            self.persist_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(url, "ledger not persisted, mark kept in memory only: {:#}", e);
        }
    }

    /// Number of marks whose ledger write failed since the store was opened.
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures.load(Ordering::Relaxed)
    }

    /// Copy of the current ledger.
    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A worker that panicked while holding the lock cannot leave the map half
    // updated (insert is the only mutation), so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, bool>> {
        self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
