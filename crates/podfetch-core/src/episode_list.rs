//! Persisted episode list: one `title,url` record per line.
//!
//! The extraction stage writes this file after scraping a listing page, so a
//! batch can be rerun without scraping again. Tab-separated `title\turl` lines
//! from bulk exports are accepted on load as well.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::item::DownloadItem;

/// Snapshot file name inside the download directory.
pub const SNAPSHOT_FILE_NAME: &str = "podcast_links.txt";

pub fn default_path(download_dir: &Path) -> PathBuf {
    download_dir.join(SNAPSHOT_FILE_NAME)
}

/// Parses one line. A tab separates title and URL when present; otherwise the
/// split is at the first comma followed by `scheme://`, so commas may appear in
/// titles and in URL query strings alike. The URL must carry a scheme.
pub fn parse_line(line: &str) -> Option<DownloadItem> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (title, url) = match line.split_once('\t') {
        Some(pair) => pair,
        None => split_before_url(line)?,
    };
    let (title, url) = (title.trim(), url.trim());
    if !has_scheme(url) {
        return None;
    }
    Some(DownloadItem::new(title, url))
}

/// Splits at the first comma whose right-hand side starts with a URL.
fn split_before_url(line: &str) -> Option<(&str, &str)> {
    line.match_indices(',')
        .map(|(i, _)| (&line[..i], &line[i + 1..]))
        .find(|(_, rest)| has_scheme(rest.trim_start()))
}

/// `true` for `scheme://rest` with an RFC 3986 scheme and a non-empty rest.
fn has_scheme(s: &str) -> bool {
    let Some((scheme, rest)) = s.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_alpha
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
}

/// Loads the list at `path`. A missing file is an empty list; malformed lines
/// are skipped with a warning.
pub fn load(path: &Path) -> Result<Vec<DownloadItem>> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("read episode list: {}", path.display()))
        }
    };
    let mut items = Vec::new();
    for (n, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(item) => items.push(item),
            None => tracing::warn!("{}:{}: skipping malformed line", path.display(), n + 1),
        }
    }
    Ok(items)
}

/// Writes `items` as `title,url` lines, replacing any previous list.
pub fn save(path: &Path, items: &[DownloadItem]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let mut out = String::new();
    for item in items {
        out.push_str(&item.title);
        out.push(',');
        out.push_str(&item.source_url);
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("write episode list: {}", path.display()))?;
    Ok(())
}
