//! Episode filename derivation and forced-download disambiguation.

use std::path::{Path, PathBuf};

/// Characters removed from titles before they become filenames.
const STRIPPED_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Maximum title length kept in a filename, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Extension appended to every episode file.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Title with the stripped characters removed and cut to [`MAX_TITLE_CHARS`].
pub fn filename_stem(title: &str) -> String {
    title
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .take(MAX_TITLE_CHARS)
        .collect()
}

/// Filename for an episode title, e.g. `"Ep: 1?"` → `"Ep 1.mp3"`.
///
/// Titles that differ only in stripped characters map to the same name.
pub fn episode_filename(title: &str) -> String {
    format!("{}.{}", filename_stem(title), AUDIO_EXTENSION)
}

/// Destination path for `title` in `dir`.
///
/// With `force`, an existing file is never reused: `_1`, `_2`, … is appended to
/// the stem until the path is free. Without `force` the plain path is returned
/// even if a file exists there.
pub fn resolve_destination(dir: &Path, title: &str, force: bool) -> PathBuf {
    let stem = filename_stem(title);
    let path = dir.join(format!("{}.{}", stem, AUDIO_EXTENSION));
    if !force || !path.exists() {
        return path;
    }
    let mut counter = 1u32;
    loop {
        let candidate = dir.join(format!("{}_{}.{}", stem, counter, AUDIO_EXTENSION));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
