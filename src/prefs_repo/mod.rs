// SQLite store for client-side preferences: JSON values under fixed namespaces.
// Recent searches and form drafts sit on top of it and never surface storage errors.

mod drafts;
mod recent;

pub use drafts::{DEFAULT_MAX_DRAFTS, Draft, DraftStore, FORM_DRAFTS_NAMESPACE};
pub use recent::{DEFAULT_RECENT_LIMIT, RECENT_SEARCHES_NAMESPACE, RecentSearches, push_recent};

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

pub struct PrefsRepo {
    pool: SqlitePool,
}

fn now_ms() -> anyhow::Result<i64> {
    Ok(std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_millis() as i64)
}

impl PrefsRepo {
    pub async fn connect(path: &str) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new().connect_with(opts).await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS prefs (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                seq INTEGER NOT NULL,
                PRIMARY KEY (namespace, key)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_prefs_namespace_seq ON prefs(namespace, seq)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self), fields(repo = "prefs", operation = "get_json"))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        namespace: &str,
        key: &str,
    ) -> anyhow::Result<Option<T>> {
        let row = sqlx::query("SELECT value FROM prefs WHERE namespace = $1 AND key = $2")
            .bind(namespace)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let value: String = row.try_get("value")?;
        Ok(Some(serde_json::from_str(&value)?))
    }

    /// Inserts or replaces; the entry becomes the newest in its namespace.
    #[instrument(skip(self, value), fields(repo = "prefs", operation = "put_json"))]
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        namespace: &str,
        key: &str,
        value: &T,
    ) -> anyhow::Result<()> {
        let json = serde_json::to_string(value)?;
        sqlx::query(
            r#"
            INSERT INTO prefs (namespace, key, value, updated_at, seq)
            VALUES ($1, $2, $3, $4, (SELECT COALESCE(MAX(seq), 0) + 1 FROM prefs))
            ON CONFLICT(namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at,
                seq = excluded.seq
            "#,
        )
        .bind(namespace)
        .bind(key)
        .bind(&json)
        .bind(now_ms()?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(repo = "prefs", operation = "delete"))]
    pub async fn delete(&self, namespace: &str, key: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM prefs WHERE namespace = $1 AND key = $2")
            .bind(namespace)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Keys of a namespace, oldest write first.
    pub async fn keys_oldest_first(&self, namespace: &str) -> anyhow::Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM prefs WHERE namespace = $1 ORDER BY seq ASC")
            .bind(namespace)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| r.try_get::<String, _>("key").map_err(Into::into))
            .collect()
    }

    /// Epoch millis of the last write to `key`.
    pub async fn updated_at(&self, namespace: &str, key: &str) -> anyhow::Result<Option<i64>> {
        let row = sqlx::query("SELECT updated_at FROM prefs WHERE namespace = $1 AND key = $2")
            .bind(namespace)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.try_get::<i64, _>("updated_at"))
            .transpose()
            .map_err(Into::into)
    }
}
