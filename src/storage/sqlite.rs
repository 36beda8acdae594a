//! Implements `Storage` on a single-table SQLite database.
//!
//! The schema is versioned. A fresh database is brought up to `SCHEMA_VERSION` by running each
//! migration in order, each inside a transaction together with the `schema_version` update.

use crate::storage::{validate_key, Storage};
use crate::Result;
use anyhow::{bail, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, trace};

/// The schema version this build expects.
const SCHEMA_VERSION: i64 = 1;

/// `(version, up_sql)`, in order.
const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    "CREATE TABLE kv (
        key   TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    );",
)];

/// Holds every key as a row of the `kv` table.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    path: PathBuf,
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens the database at `path`, creating it and migrating the schema as needed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .context("Failed to parse SQLite connection string")?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open SQLite database at {}", path.display()))?;

        let storage = Self { path, pool };
        storage.migrate().await?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
            .execute(&self.pool)
            .await
            .context("Failed to create schema_version table")?;

        let current: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
            .fetch_one(&self.pool)
            .await
            .context("Failed to query schema version")?;
        let current = current.unwrap_or(0);

        if current > SCHEMA_VERSION {
            bail!(
                "The database at {} has schema version {current}, which is newer than this \
                program understands ({SCHEMA_VERSION})",
                self.path.display()
            );
        }

        for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
            debug!("Running migration {version:02}");
            let mut tx = self
                .pool
                .begin()
                .await
                .context("Failed to begin migration transaction")?;
            sqlx::query(sql)
                .execute(&mut *tx)
                .await
                .context("Failed to execute migration SQL")?;
            sqlx::query("DELETE FROM schema_version")
                .execute(&mut *tx)
                .await
                .context("Failed to clear schema_version")?;
            sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                .bind(*version)
                .execute(&mut *tx)
                .await
                .context("Failed to update schema_version")?;
            tx.commit()
                .await
                .context("Failed to commit migration transaction")?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Storage for SqliteStorage {
    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        trace!("get {key} from {}", self.path.display());
        sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read '{key}' from SQLite"))
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        trace!("set {key} in {}", self.path.display());
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write '{key}' to SQLite"))?;
        Ok(())
    }
}
