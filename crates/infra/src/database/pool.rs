//! SQLite connection pool helpers
//!
//! Every pooled connection gets the SQLCipher key (when configured) before
//! any other statement, then the standard pragmas.

use std::path::Path;
use std::time::Duration;

use jobsync_domain::Result as DomainResult;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use zeroize::Zeroizing;

use crate::errors::InfraError;

/// Pool of SQLite connections.
pub type SqlitePool = Pool<SqliteConnectionManager>;

/// Connection checked out of a [`SqlitePool`].
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a pool for the database at `path`.
///
/// The SQLCipher passphrase lives in the pool's init hook for as long as the
/// pool does and is wiped when the pool is dropped.
///
/// # Errors
///
/// Returns [`JobSyncError::Database`](jobsync_domain::JobSyncError) when the
/// first connection cannot be opened or keyed.
pub fn create_pool<P: AsRef<Path>>(
    path: P,
    pool_size: u32,
    encryption_key: Option<Zeroizing<String>>,
) -> DomainResult<SqlitePool> {
    let manager = SqliteConnectionManager::file(path.as_ref()).with_init(move |conn| {
        configure_connection(conn, encryption_key.as_deref().map(String::as_str))
    });

    Pool::builder()
        .max_size(pool_size.max(1))
        .connection_timeout(CONNECTION_TIMEOUT)
        .build(manager)
        .map_err(|e| InfraError::from(e).into())
}

fn configure_connection(conn: &mut Connection, encryption_key: Option<&str>) -> rusqlite::Result<()> {
    if let Some(key) = encryption_key {
        // Must run before anything touches the database file.
        conn.pragma_update(None, "key", key)?;
    }

    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA synchronous=NORMAL;
         PRAGMA foreign_keys=ON;",
    )?;
    conn.busy_timeout(BUSY_TIMEOUT)
}
