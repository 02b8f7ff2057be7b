//! One item: fetch into a temp file, pick the final name, move, mark.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::FetchPipeline;
use crate::item::{DownloadItem, DownloadResult};
use crate::naming;
use crate::transport::FetchError;

/// Distinguishes temp files of concurrent attempts within one process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

const TEMP_SUFFIX: &str = ".part";

fn temp_path(dir: &Path) -> PathBuf {
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    dir.join(format!(".podfetch-{}-{}{}", std::process::id(), seq, TEMP_SUFFIX))
}

impl FetchPipeline {
    /// Fetches `item` without consulting the ledger and records it on success.
    pub(super) fn fetch_and_store(&self, item: &DownloadItem, force: bool) -> DownloadResult {
        tracing::info!(title = %item.title, url = %item.source_url, force, "downloading");
        match self.fetch_to_destination(item, force) {
            Ok(path) => {
                self.store.mark_downloaded(&item.source_url);
                tracing::info!(title = %item.title, "saved to {}", path.display());
                DownloadResult::success(item, path)
            }
            Err(e) => {
                tracing::warn!(
                    title = %item.title,
                    url = %item.source_url,
                    "download failed: {}",
                    e
                );
                DownloadResult::failed(item, e.to_string())
            }
        }
    }

    fn fetch_to_destination(
        &self,
        item: &DownloadItem,
        force: bool,
    ) -> Result<PathBuf, FetchError> {
        let dir = &self.download_dir;
        fs::create_dir_all(dir).map_err(|e| FetchError::filesystem(dir, e))?;

        let temp = temp_path(dir);
        if let Err(e) = self.stream_to(&item.source_url, &temp) {
            discard(&temp);
            return Err(e);
        }

        let dest = naming::resolve_destination(dir, &item.title, force);
        if let Err(e) = fs::rename(&temp, &dest) {
            discard(&temp);
            return Err(FetchError::filesystem(&dest, e));
        }
        Ok(dest)
    }

    /// Streams the body of `url` into a new file at `path` and syncs it.
    fn stream_to(&self, url: &str, path: &Path) -> Result<u64, FetchError> {
        let file = File::create(path).map_err(|e| FetchError::filesystem(path, e))?;
        let mut writer = BufWriter::new(file);
        let bytes = self.transport.fetch(url, &mut writer)?;
        writer.flush().map_err(FetchError::Write)?;
        let file = writer
            .into_inner()
            .map_err(|e| FetchError::Write(e.into_error()))?;
        file.sync_all().map_err(|e| FetchError::filesystem(path, e))?;
        tracing::debug!(url, bytes, "transfer complete");
        Ok(bytes)
    }
}

fn discard(temp: &Path) {
    if let Err(e) = fs::remove_file(temp) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!("could not remove temp file {}: {}", temp.display(), e);
        }
    }
}
