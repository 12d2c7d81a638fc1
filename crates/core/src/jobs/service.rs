//! Read-side job service

use std::sync::Arc;

use jobsync_domain::{
    extract_stage_names, HistorySummary, JobDefinition, JobHistory, JobKind, JobSyncError, Result,
};
use uuid::Uuid;

use super::ports::{JobHistoryRepository, JobRepository};

/// Queries over jobs and their version history
pub struct JobService {
    jobs: Arc<dyn JobRepository>,
    history: Arc<dyn JobHistoryRepository>,
}

impl JobService {
    /// Read-side service over the job and history stores.
    #[must_use]
    pub fn new(jobs: Arc<dyn JobRepository>, history: Arc<dyn JobHistoryRepository>) -> Self {
        Self { jobs, history }
    }

    /// Live job by id
    ///
    /// # Errors
    ///
    /// Returns [`JobSyncError::NotFound`] for unknown or soft-deleted jobs.
    pub async fn get_job(&self, job_id: Uuid) -> Result<JobDefinition> {
        self.jobs.find_live(job_id).await?.ok_or_else(|| JobSyncError::NotFound(format!("job {job_id}")))
    }

    /// Live jobs of a connection
    pub async fn list_jobs(&self, connection_id: Uuid) -> Result<Vec<JobDefinition>> {
        self.jobs.list_by_connection(connection_id).await
    }

    /// Version list of a job, oldest first
    pub async fn history(&self, job_id: Uuid) -> Result<Vec<HistorySummary>> {
        self.history.list(job_id).await
    }

    /// One history entry with its rendered config
    ///
    /// # Errors
    ///
    /// Returns [`JobSyncError::NotFound`] for an unknown id.
    pub async fn history_entry(&self, history_id: Uuid) -> Result<JobHistory> {
        self.history
            .find(history_id)
            .await?
            .ok_or_else(|| JobSyncError::NotFound(format!("history entry {history_id}")))
    }

    /// Stage names declared by a pipeline job's script, in order
    ///
    /// # Errors
    ///
    /// Returns [`JobSyncError::InvalidInput`] for a freestyle job.
    pub async fn stages(&self, job_id: Uuid) -> Result<Vec<String>> {
        let job = self.get_job(job_id).await?;
        if job.kind != JobKind::Pipeline {
            return Err(JobSyncError::InvalidInput(format!(
                "job '{}' is a {} job and has no stages",
                job.name, job.kind
            )));
        }
        Ok(extract_stage_names(&job.spec.script))
    }
}
