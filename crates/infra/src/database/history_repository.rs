//! SQLite implementation of the read-only history port.

use std::sync::Arc;

use async_trait::async_trait;
use jobsync_core::JobHistoryRepository;
use jobsync_domain::{HistorySummary, JobHistory, Result as DomainResult};
use uuid::Uuid;

use super::manager::{run_blocking, DbManager};
use super::version_ledger;

/// SQLite-backed history reader.
pub struct SqliteHistoryRepository {
    db: Arc<DbManager>,
}

impl SqliteHistoryRepository {
    /// Repository backed by the shared manager.
    #[must_use]
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl JobHistoryRepository for SqliteHistoryRepository {
    async fn list(&self, job_id: Uuid) -> DomainResult<Vec<HistorySummary>> {
        run_blocking(&self.db, move |conn| version_ledger::list(conn, job_id)).await
    }

    async fn find(&self, history_id: Uuid) -> DomainResult<Option<JobHistory>> {
        run_blocking(&self.db, move |conn| version_ledger::find(conn, history_id)).await
    }
}
