//! Bounded-concurrency fetch pipeline.
//!
//! Takes a batch of `(title, url)` items, skips URLs the ledger already has
//! (unless forced), and downloads the rest with at most `max_workers` OS
//! threads draining a shared queue. Every item ends in exactly one
//! [`DownloadResult`]; failures never abort the batch.

mod single;

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex, PoisonError};

use crate::item::{DownloadItem, DownloadResult};
use crate::status_store::StatusStore;
use crate::transport::Transport;

/// Downloads items into `download_dir`, recording successes in the shared ledger.
///
/// Cheap to clone: each worker thread gets its own clone.
#[derive(Clone)]
pub struct FetchPipeline {
    store: Arc<StatusStore>,
    transport: Arc<dyn Transport>,
    download_dir: PathBuf,
}

impl FetchPipeline {
    pub fn new(
        store: Arc<StatusStore>,
        transport: Arc<dyn Transport>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            transport,
            download_dir: download_dir.into(),
        }
    }

    pub fn store(&self) -> &Arc<StatusStore> {
        &self.store
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Downloads one item now. Same semantics as a one-item batch.
    pub fn download_one(&self, item: &DownloadItem, force: bool) -> DownloadResult {
        if !force && self.store.is_downloaded(&item.source_url) {
            tracing::debug!(url = %item.source_url, "already downloaded, skipping");
            return DownloadResult::skipped(item);
        }
        self.fetch_and_store(item, force)
    }

    /// Downloads a batch with at most `max_workers` transfers in flight.
    ///
    /// Blocks until every item is terminal. Results are in completion order,
    /// not submission order. `max_workers` of 0 is treated as 1.
    pub fn download_batch(
        &self,
        items: Vec<DownloadItem>,
        max_workers: usize,
        force: bool,
    ) -> Vec<DownloadResult> {
        let total = items.len();
        let mut results = Vec::with_capacity(total);
        let mut queue = VecDeque::with_capacity(total);
        for item in items {
            if !force && self.store.is_downloaded(&item.source_url) {
                tracing::debug!(url = %item.source_url, "already downloaded, skipping");
                results.push(DownloadResult::skipped(&item));
            } else {
                queue.push_back(item);
            }
        }

        let count = queue.len();
        if count == 0 {
            return results;
        }

        let num_workers = max_workers.max(1).min(count);
        tracing::info!(
            items = total,
            queued = count,
            workers = num_workers,
            force,
            "starting batch"
        );

        let work: Arc<Mutex<VecDeque<DownloadItem>>> = Arc::new(Mutex::new(queue));
        let (tx, rx) = mpsc::channel();
        let mut handles = Vec::with_capacity(num_workers);
        for n in 0..num_workers {
            let work = Arc::clone(&work);
            let tx = tx.clone();
            let pipeline = self.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("podfetch-worker-{n}"))
                .spawn(move || pipeline.drain(&work, force, |res| tx.send(res).is_ok()));
            match spawned {
                Ok(h) => handles.push(h),
                Err(e) => tracing::warn!("could not spawn worker {}: {}", n, e),
            }
        }
        drop(tx);

        if handles.is_empty() {
            // No thread could be started; run the queue on the caller's thread.
            self.drain(&work, force, |res| {
                results.push(res);
                true
            });
            return results;
        }

        results.extend(rx.iter());
        for h in handles {
            if h.join().is_err() {
                tracing::warn!("download worker exited with a panic");
            }
        }
        results
    }

    /// Pops items until the queue is empty, handing each result to `emit`.
    /// Stops early if `emit` returns false (receiver gone).
    fn drain(
        &self,
        work: &Mutex<VecDeque<DownloadItem>>,
        force: bool,
        mut emit: impl FnMut(DownloadResult) -> bool,
    ) {
        loop {
            let item = match work
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
            {
                Some(item) => item,
                None => break,
            };
            let res = panic::catch_unwind(AssertUnwindSafe(|| self.fetch_and_store(&item, force)))
                .unwrap_or_else(|_| DownloadResult::failed(&item, "download worker panicked"));
            if !emit(res) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests;
