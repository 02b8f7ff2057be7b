//! SQLite-backed catalog: connection, migrations, and timestamp helpers.
//! Podcast/episode CRUD lives in `episodes`.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the podcast/episode catalog.
///
/// The database file is stored under the XDG state directory:
/// `~/.local/state/podfetch/podcasts.db`.
#[derive(Clone)]
pub struct Catalog {
    pub(crate) pool: Pool<Sqlite>,
}

impl Catalog {
    /// Open (or create) the default catalog and run migrations.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("podfetch")?;
        let db_path = xdg_dirs.get_state_home().join("podcasts.db");
        Self::open_at(db_path).await
    }

    /// Open (or create) the catalog at a specific path. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&uri)
            .await?;
        let db = Catalog { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS podcasts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        // podcast_id is nullable: items imported from a bare list have no parent.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS episodes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                podcast_id INTEGER REFERENCES podcasts(id),
                downloaded INTEGER NOT NULL DEFAULT 0,
                download_path TEXT,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Catalogs created before download tracking lack these columns.
        self.add_column_if_missing("episodes", "downloaded", "INTEGER NOT NULL DEFAULT 0").await?;
        self.add_column_if_missing("episodes", "download_path", "TEXT").await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_episodes_podcast_id ON episodes (podcast_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn add_column_if_missing(&self, table: &str, column: &str, decl: &str) -> Result<()> {
        let present: Option<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info(?1) WHERE name = ?2")
                .bind(table)
                .bind(column)
                .fetch_optional(&self.pool)
                .await?;
        if present.is_none() {
            sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl}"))
                .execute(&self.pool)
                .await?;
            tracing::info!("catalog: added column {}.{}", table, column);
        }
        Ok(())
    }
}

/// Current time as Unix seconds (for DB timestamps).
pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
/// Open an in-memory catalog for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<Catalog> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = Catalog { pool };
    db.migrate().await?;
    Ok(db)
}
