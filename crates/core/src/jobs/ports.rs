//! Port interfaces for job storage

use async_trait::async_trait;
use jobsync_domain::{
    DeleteMode, HistorySummary, JobDefinition, JobHistory, JobSpec, RemoteConnection, Result,
};
use uuid::Uuid;

/// Storage for job definitions. Every write that changes the rendered
/// configuration also appends to the version ledger in the same transaction.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a new job and history version 1 atomically.
    async fn insert_with_history(&self, job: &JobDefinition, config: &str) -> Result<JobHistory>;

    /// Replace the job's fields and append the next history version atomically.
    async fn update_with_history(
        &self,
        job_id: Uuid,
        spec: &JobSpec,
        config: &str,
        now: i64,
    ) -> Result<JobHistory>;

    /// Copy the snapshot fields of `history` back onto its live job.
    async fn restore_from_history(&self, history: &JobHistory, now: i64) -> Result<JobDefinition>;

    /// Soft- or hard-delete a live job. Returns `false` if nothing matched.
    async fn delete(&self, job_id: Uuid, mode: DeleteMode, now: i64) -> Result<bool>;

    /// Remove a job row regardless of state, cascading to its history.
    async fn purge(&self, job_id: Uuid) -> Result<bool>;

    /// Live (not soft-deleted) job by id.
    async fn find_live(&self, job_id: Uuid) -> Result<Option<JobDefinition>>;

    /// Live job by name within one connection.
    async fn find_by_name(&self, connection_id: Uuid, name: &str) -> Result<Option<JobDefinition>>;

    /// Live jobs of one connection ordered by name.
    async fn list_by_connection(&self, connection_id: Uuid) -> Result<Vec<JobDefinition>>;
}

/// Read access to the version ledger.
#[async_trait]
pub trait JobHistoryRepository: Send + Sync {
    /// History entries of a job ordered by version.
    async fn list(&self, job_id: Uuid) -> Result<Vec<HistorySummary>>;

    /// Full history entry, including the rendered config.
    async fn find(&self, history_id: Uuid) -> Result<Option<JobHistory>>;
}

/// Storage for remote server connections.
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    async fn save(&self, connection: &RemoteConnection) -> Result<()>;

    async fn find(&self, id: Uuid) -> Result<Option<RemoteConnection>>;
}
