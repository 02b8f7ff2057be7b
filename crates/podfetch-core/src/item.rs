//! Download items and per-item results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One downloadable episode: a title and the audio URL.
///
/// Dedup identity is `source_url`, compared as an exact string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadItem {
    pub title: String,
    pub source_url: String,
}

impl DownloadItem {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
        }
    }
}

/// Terminal state of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Payload written and recorded in the ledger.
    Success,
    /// Ledger already had the URL; no network call was made.
    Skipped,
    /// Transport, HTTP or filesystem failure. Holds the cause chain.
    Failed(String),
}

/// Result for one item of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub title: String,
    pub source_url: String,
    pub outcome: DownloadOutcome,
    /// Where the payload was written (Success only).
    pub path: Option<PathBuf>,
}

impl DownloadResult {
    pub(crate) fn success(item: &DownloadItem, path: PathBuf) -> Self {
        Self {
            title: item.title.clone(),
            source_url: item.source_url.clone(),
            outcome: DownloadOutcome::Success,
            path: Some(path),
        }
    }

    pub(crate) fn skipped(item: &DownloadItem) -> Self {
        Self {
            title: item.title.clone(),
            source_url: item.source_url.clone(),
            outcome: DownloadOutcome::Skipped,
            path: None,
        }
    }

    pub(crate) fn failed(item: &DownloadItem, reason: impl Into<String>) -> Self {
        Self {
            title: item.title.clone(),
            source_url: item.source_url.clone(),
            outcome: DownloadOutcome::Failed(reason.into()),
            path: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == DownloadOutcome::Success
    }

    pub fn is_skipped(&self) -> bool {
        self.outcome == DownloadOutcome::Skipped
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, DownloadOutcome::Failed(_))
    }
}

impl fmt::Display for DownloadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            DownloadOutcome::Success => write!(f, "downloaded: {}", self.title),
            DownloadOutcome::Skipped => {
                write!(f, "'{}' already downloaded, skipped", self.title)
            }
            DownloadOutcome::Failed(reason) => {
                write!(f, "error downloading '{}': {}", self.title, reason)
            }
        }
    }
}

/// Counts of each outcome in a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[DownloadResult]) -> Self {
        let mut s = BatchSummary::default();
        for r in results {
            match r.outcome {
                DownloadOutcome::Success => s.succeeded += 1,
                DownloadOutcome::Skipped => s.skipped += 1,
                DownloadOutcome::Failed(_) => s.failed += 1,
            }
        }
        s
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}
