//! Ledger file I/O: a flat JSON object of URL → bool, rewritten in full.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// `download_status.json` → `download_status.json.part`.
fn temp_path(path: &Path) -> PathBuf {
    let mut o = path.as_os_str().to_owned();
    o.push(".part");
    PathBuf::from(o)
}

/// Reads the ledger. Returns `Ok(None)` if the file does not exist.
pub(super) fn load(path: &Path) -> Result<Option<BTreeMap<String, bool>>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read ledger: {}", path.display())),
    };
    let ledger: BTreeMap<String, bool> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse ledger: {}", path.display()))?;
    Ok(Some(ledger))
}

/// Writes the full ledger through a `.part` file and renames it into place,
/// so the previous ledger survives a crash mid-write.
pub(super) fn save(path: &Path, ledger: &BTreeMap<String, bool>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(ledger).context("serialize ledger")?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, json).with_context(|| format!("write ledger: {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| {
        format!("failed to rename {} to {}", tmp.display(), path.display())
    })?;
    Ok(())
}
