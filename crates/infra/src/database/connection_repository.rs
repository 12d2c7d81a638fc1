//! SQLite implementation of the remote connection port.
//!
//! Secrets arrive here already encrypted; this layer never sees plaintext.

use std::sync::Arc;

use async_trait::async_trait;
use jobsync_core::ConnectionRepository;
use jobsync_domain::{RemoteConnection, Result as DomainResult};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::manager::{map_sql_error, run_blocking, DbManager};
use super::rows::uuid_at;

/// SQLite-backed connection repository.
pub struct SqliteConnectionRepository {
    db: Arc<DbManager>,
}

impl SqliteConnectionRepository {
    /// Repository backed by the shared manager.
    #[must_use]
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConnectionRepository for SqliteConnectionRepository {
    async fn save(&self, connection: &RemoteConnection) -> DomainResult<()> {
        let connection = connection.clone();
        run_blocking(&self.db, move |conn| {
            conn.execute(
                CONNECTION_UPSERT_SQL,
                params![
                    connection.id.to_string(),
                    connection.name,
                    connection.description,
                    connection.base_uri,
                    connection.principal,
                    connection.encrypted_secret,
                    connection.created_at,
                ],
            )
            .map(|_| ())
            .map_err(map_sql_error)
        })
        .await
    }

    async fn find(&self, id: Uuid) -> DomainResult<Option<RemoteConnection>> {
        run_blocking(&self.db, move |conn| {
            conn.query_row(CONNECTION_SELECT_SQL, params![id.to_string()], map_connection_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
    }
}

const CONNECTION_UPSERT_SQL: &str = "INSERT INTO remote_connection (
        id, name, description, base_uri, principal, encrypted_secret, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        description = excluded.description,
        base_uri = excluded.base_uri,
        principal = excluded.principal,
        encrypted_secret = excluded.encrypted_secret";

const CONNECTION_SELECT_SQL: &str = "SELECT
        id, name, description, base_uri, principal, encrypted_secret, created_at
    FROM remote_connection WHERE id = ?1";

fn map_connection_row(row: &Row<'_>) -> rusqlite::Result<RemoteConnection> {
    Ok(RemoteConnection {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        base_uri: row.get(3)?,
        principal: row.get(4)?,
        encrypted_secret: row.get(5)?,
        created_at: row.get(6)?,
    })
}
