//! Database connection manager backed by an r2d2 SQLite pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jobsync_domain::{DatabaseConfig, JobSyncError, Result};
use rusqlite::{params, Connection};
use tokio::task;
use tracing::info;
use zeroize::Zeroizing;

use super::pool::{create_pool, PooledConn, SqlitePool};
use crate::errors::InfraError;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Database manager that wraps a [`SqlitePool`].
pub struct DbManager {
    pool: SqlitePool,
    path: PathBuf,
}

impl DbManager {
    /// Create a new manager with the given pool size and optional SQLCipher
    /// key.
    ///
    /// # Errors
    ///
    /// Returns `JobSyncError::Database` if the pool cannot open the file or
    /// the key does not unlock it.
    pub fn new<P: AsRef<Path>>(
        db_path: P,
        pool_size: u32,
        encryption_key: Option<&str>,
    ) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let pool = create_pool(&path, pool_size, encryption_key.map(|key| Zeroizing::new(key.to_owned())))?;

        info!(
            db_path = %path.display(),
            max_connections = pool.max_size(),
            encrypted = encryption_key.is_some(),
            "sqlite pool initialised"
        );

        Ok(Self { pool, path })
    }

    /// Build a manager from configuration and bring the schema up to date.
    ///
    /// # Errors
    ///
    /// Same as [`DbManager::new`], plus schema creation failures.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let manager = Self::new(&config.path, config.pool_size, config.encryption_key.as_deref().map(String::as_str))?;
        manager.run_migrations()?;
        Ok(manager)
    }

    /// Acquire a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns `JobSyncError::Database` when the pool times out.
    pub fn get_connection(&self) -> Result<PooledConn> {
        self.pool.get().map_err(|e| InfraError::from(e).into())
    }

    /// Ensure the full schema exists on the current database.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        create_schema(&conn)
    }

    /// Return the configured database path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Perform a health check to verify database connectivity.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0)).map_err(map_sql_error)?;
        Ok(())
    }
}

fn create_schema(conn: &PooledConn) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?, CAST(strftime('%s','now') AS INTEGER))",
        params![SCHEMA_VERSION],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

/// Run `f` on a pooled connection inside `spawn_blocking`.
pub(crate) async fn run_blocking<T, F>(db: &Arc<DbManager>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
{
    let db = Arc::clone(db);
    task::spawn_blocking(move || -> Result<T> {
        let mut conn = db.get_connection()?;
        f(&mut *conn)
    })
    .await
    .map_err(map_join_error)?
}

pub(crate) fn map_sql_error(err: rusqlite::Error) -> JobSyncError {
    JobSyncError::from(InfraError::from(err))
}

pub(crate) fn map_join_error(err: task::JoinError) -> JobSyncError {
    if err.is_cancelled() {
        JobSyncError::Internal("blocking database task cancelled".into())
    } else {
        JobSyncError::Internal(format!("blocking database task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const TEST_KEY: &str = "test_key_64_chars_long_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    #[test]
    fn migrations_create_schema_version() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4, Some(TEST_KEY)).expect("manager created");
        manager.run_migrations().expect("migrations run");
        manager.run_migrations().expect("migrations are idempotent");

        let conn = manager.get_connection().expect("connection acquired");
        let version: i32 =
            conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0)).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn open_applies_schema_without_key() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let config = DatabaseConfig {
            path: temp_dir.path().join("plain.db").display().to_string(),
            pool_size: 2,
            encryption_key: None,
        };

        let manager = DbManager::open(&config).expect("manager opened");
        manager.health_check().expect("health check passed");

        let conn = manager.get_connection().unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('remote_connection', 'job', 'job_history')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }
}
