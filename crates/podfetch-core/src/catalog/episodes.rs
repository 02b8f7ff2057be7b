//! Podcast and episode upserts and reads.

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::path::Path;

use super::db::{unix_timestamp, Catalog};
use super::types::{Episode, Podcast, PodcastHistory, RowId};
use crate::item::{DownloadItem, DownloadResult};

const EPISODE_COLUMNS: &str = "e.id, e.title, e.url, e.podcast_id, e.downloaded, \
e.download_path, e.created_at, p.name AS podcast_name";

fn podcast_from_row(row: &SqliteRow) -> Podcast {
    Podcast {
        id: row.get("id"),
        url: row.get("url"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

fn episode_from_row(row: &SqliteRow) -> Episode {
    Episode {
        id: row.get("id"),
        title: row.get("title"),
        url: row.get("url"),
        podcast_id: row.get("podcast_id"),
        podcast_name: row.get("podcast_name"),
        downloaded: row.get("downloaded"),
        download_path: row.get("download_path"),
        created_at: row.get("created_at"),
    }
}

impl Catalog {
    /// Insert a podcast, or rename it if the URL is already known. Returns its id.
    pub async fn upsert_podcast(&self, url: &str, name: &str) -> Result<RowId> {
        sqlx::query(
            r#"
            INSERT INTO podcasts (url, name, created_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(url) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(url)
        .bind(name)
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT id FROM podcasts WHERE url = ?1")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("id"))
    }

    pub async fn get_podcast_by_url(&self, url: &str) -> Result<Option<Podcast>> {
        let row = sqlx::query("SELECT id, url, name, created_at FROM podcasts WHERE url = ?1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(podcast_from_row))
    }

    /// All podcasts, by name.
    pub async fn list_podcasts(&self) -> Result<Vec<Podcast>> {
        let rows = sqlx::query("SELECT id, url, name, created_at FROM podcasts ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(podcast_from_row).collect())
    }

    /// Insert an episode, or update its title if the URL is already known.
    /// An existing podcast link is kept when `podcast_id` is None.
    pub async fn upsert_episode(
        &self,
        title: &str,
        url: &str,
        podcast_id: Option<RowId>,
    ) -> Result<RowId> {
        sqlx::query(
            r#"
            INSERT INTO episodes (title, url, podcast_id, created_at) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(url) DO UPDATE SET
                title = excluded.title,
                podcast_id = COALESCE(excluded.podcast_id, episodes.podcast_id)
            "#,
        )
        .bind(title)
        .bind(url)
        .bind(podcast_id)
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT id FROM episodes WHERE url = ?1")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("id"))
    }

    /// Upserts every item under `podcast_id`. Returns how many were written.
    pub async fn import_items(
        &self,
        items: &[DownloadItem],
        podcast_id: Option<RowId>,
    ) -> Result<usize> {
        for item in items {
            self.upsert_episode(&item.title, &item.source_url, podcast_id)
                .await
                .with_context(|| format!("import episode {}", item.source_url))?;
        }
        Ok(items.len())
    }

    /// All episodes with their podcast name, newest first.
    pub async fn list_episodes(&self) -> Result<Vec<Episode>> {
        let sql = format!(
            "SELECT {EPISODE_COLUMNS} FROM episodes e \
             LEFT JOIN podcasts p ON p.id = e.podcast_id \
             ORDER BY e.created_at DESC, e.id DESC"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(episode_from_row).collect())
    }

    /// Episodes of one podcast, newest first.
    pub async fn episodes_for_podcast(&self, podcast_id: RowId) -> Result<Vec<Episode>> {
        let sql = format!(
            "SELECT {EPISODE_COLUMNS} FROM episodes e \
             JOIN podcasts p ON p.id = e.podcast_id \
             WHERE e.podcast_id = ?1 \
             ORDER BY e.created_at DESC, e.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(podcast_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(episode_from_row).collect())
    }

    /// Every podcast with its episodes. Podcasts without episodes are included.
    pub async fn podcast_history(&self) -> Result<Vec<PodcastHistory>> {
        let mut history = Vec::new();
        for podcast in self.list_podcasts().await? {
            let episodes = self.episodes_for_podcast(podcast.id).await?;
            history.push(PodcastHistory { podcast, episodes });
        }
        Ok(history)
    }

    /// Flags the episode at `url` as downloaded to `path`.
    /// Returns false when the URL is not in the catalog.
    pub async fn mark_episode_downloaded(&self, url: &str, path: &Path) -> Result<bool> {
        let done = sqlx::query(
            r#"
            UPDATE episodes SET downloaded = 1, download_path = ?1 WHERE url = ?2
            "#,
        )
        .bind(path.to_string_lossy().into_owned())
        .bind(url)
        .execute(&self.pool)
        .await?;
        Ok(done.rows_affected() > 0)
    }

    /// Marks every successful result that is catalogued. Returns how many rows changed.
    pub async fn record_downloads(&self, results: &[DownloadResult]) -> Result<usize> {
        let mut marked = 0;
        for res in results.iter().filter(|r| r.is_success()) {
            let Some(path) = &res.path else { continue };
            if self
                .mark_episode_downloaded(&res.source_url, path)
                .await
                .with_context(|| format!("mark episode {}", res.source_url))?
            {
                marked += 1;
            }
        }
        Ok(marked)
    }
}
