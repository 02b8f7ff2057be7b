//! Catalog row types.

/// Row id in the catalog tables.
pub type RowId = i64;

/// A podcast (listing page) the episodes were scraped from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Podcast {
    pub id: RowId,
    pub url: String,
    pub name: String,
    pub created_at: i64,
}

/// One episode, with the owning podcast's name when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub id: RowId,
    pub title: String,
    pub url: String,
    pub podcast_id: Option<RowId>,
    pub podcast_name: Option<String>,
    /// Set once a download of this URL succeeded.
    pub downloaded: bool,
    /// Where the last successful download was written.
    pub download_path: Option<String>,
    pub created_at: i64,
}

/// One podcast with its episodes, for the grouped history view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodcastHistory {
    pub podcast: Podcast,
    pub episodes: Vec<Episode>,
}

impl PodcastHistory {
    pub fn downloaded_count(&self) -> usize {
        self.episodes.iter().filter(|e| e.downloaded).count()
    }
}
