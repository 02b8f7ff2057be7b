//! Tracing setup for podfetch.
//!
//! Download workers log per-episode progress (start, saved path, failure
//! reason) and the status store logs swallowed ledger write errors, so these
//! records go to a persistent file: `$XDG_STATE_HOME/podfetch/podfetch.log`.
//! The CLI keeps stdout for per-episode result lines and the batch summary.
//! `RUST_LOG` overrides the default filter.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Debug for podfetch's own crates (per-item skips, transfer byte counts), info elsewhere.
const DEFAULT_FILTER: &str = "info,podfetch=debug,podfetch_core=debug";

const LOG_FILE_NAME: &str = "podfetch.log";

/// Per-event sink. Worker threads each get a handle to the shared log file;
/// if the handle cannot be duplicated the event goes to stderr instead of
/// being lost.
enum LogSink {
    File(File),
    Stderr,
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct SharedLogFile(File);

impl<'a> MakeWriter<'a> for SharedLogFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogSink::File)
            .unwrap_or(LogSink::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Where `init_logging` appends: `$XDG_STATE_HOME/podfetch/podfetch.log`.
/// Creates the state directory.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("podfetch")?;
    xdg_dirs
        .place_state_file(LOG_FILE_NAME)
        .context("create podfetch state directory")
}

/// Installs the global subscriber writing to [`log_file_path`], without ANSI
/// colours. Errors if the file cannot be opened or a subscriber is already
/// set; the CLI then falls back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(BoxMakeWriter::new(SharedLogFile(file)))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "podfetch logging to {}",
        path.display()
    );
    Ok(())
}

/// Same filter and format as [`init_logging`], but on stderr. Used when the
/// state directory is unwritable so downloads still run with visible logs.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
