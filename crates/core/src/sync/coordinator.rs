//! Saga coordinator keeping local jobs and the remote build server in step
//!
//! Every operation runs in two phases: one local transaction, then exactly
//! one remote call after commit. Only create compensates; update, delete and
//! rollback keep their committed local state when the remote call fails.
//!
//! Each saga runs on its own spawned task. Dropping the future returned by a
//! public method does not stop the remote call or the compensation.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use jobsync_domain::{
    DeleteMode, JobDefinition, JobSyncError, JobUpdate, NewJob, RemoteConnection, SagaState,
    SyncOperation, SyncReceipt,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::errors::{CompensationError, SagaError, SyncError};
use super::intents;
use super::ports::RemoteJobClient;
use super::saga::Saga;
use crate::jobs::ports::{ConnectionRepository, JobHistoryRepository, JobRepository};
use crate::merge::XmlPatchMerger;
use crate::template::{job_context, wrap_patch, ConfigTemplateEngine};

/// Coordinates create, update, delete and rollback sagas.
#[derive(Clone)]
pub struct SyncCoordinator {
    jobs: Arc<dyn JobRepository>,
    history: Arc<dyn JobHistoryRepository>,
    connections: Arc<dyn ConnectionRepository>,
    remote: Arc<dyn RemoteJobClient>,
    templates: Arc<ConfigTemplateEngine>,
    merger: XmlPatchMerger,
}

impl SyncCoordinator {
    /// Coordinator over the given stores, remote client and templates.
    #[must_use]
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        history: Arc<dyn JobHistoryRepository>,
        connections: Arc<dyn ConnectionRepository>,
        remote: Arc<dyn RemoteJobClient>,
        templates: Arc<ConfigTemplateEngine>,
    ) -> Self {
        Self { jobs, history, connections, remote, templates, merger: XmlPatchMerger::new() }
    }

    /// Create a job locally with history version 1, then on the remote
    /// server. A remote failure deletes the local rows again.
    ///
    /// # Errors
    ///
    /// Returns [`SagaError::Store`] for an invalid request, unknown
    /// connection or duplicate name, [`SagaError::Template`] when rendering
    /// fails, [`SagaError::Remote`] after a successful compensation and
    /// [`SagaError::Compensation`] when the local rows could not be removed.
    pub async fn create_job(&self, request: NewJob) -> Result<SyncReceipt, SagaError> {
        let this = self.clone();
        detach(async move { this.run_create(request).await }).await
    }

    /// Merge the new fields into the remote configuration, record the next
    /// version, then push the merged configuration.
    ///
    /// # Errors
    ///
    /// Fails before any write when the job is unknown, the remote
    /// configuration cannot be fetched or the merge fails. A failed push
    /// returns [`SagaError::Remote`] with the new version kept locally.
    pub async fn update_job(&self, update: JobUpdate) -> Result<SyncReceipt, SagaError> {
        let this = self.clone();
        detach(async move { this.run_update(update).await }).await
    }

    /// Delete a job locally, then on the remote server.
    ///
    /// # Errors
    ///
    /// Returns [`SagaError::Store`] when the job is unknown and
    /// [`SagaError::Remote`] when the remote delete fails after the local one.
    pub async fn delete_job(
        &self,
        job_id: Uuid,
        mode: DeleteMode,
    ) -> Result<SyncReceipt, SagaError> {
        let this = self.clone();
        detach(async move { this.run_delete(job_id, mode).await }).await
    }

    /// Restore a job to a recorded version and push that version's config.
    ///
    /// # Errors
    ///
    /// Returns [`SagaError::Store`] for an unknown history id or a deleted
    /// job and [`SagaError::Remote`] when the push fails.
    pub async fn rollback(&self, history_id: Uuid) -> Result<SyncReceipt, SagaError> {
        let this = self.clone();
        detach(async move { this.run_rollback(history_id).await }).await
    }

    async fn run_create(&self, request: NewJob) -> Result<SyncReceipt, SagaError> {
        request.validate()?;
        let connection = self.connection(request.connection_id).await?;

        if self.jobs.find_by_name(request.connection_id, &request.name).await?.is_some() {
            return Err(JobSyncError::Conflict(format!(
                "job '{}' already exists on connection {}",
                request.name, request.connection_id
            ))
            .into());
        }

        let config =
            self.templates.render(request.kind.config_template(), &job_context(&request.spec))?;
        let job = request.into_definition(Uuid::new_v4(), Utc::now().timestamp());
        let intent = intents::create_item(&connection, &job, &config);

        let mut saga = Saga::begin(job.id, SyncOperation::Create);
        let history = self.jobs.insert_with_history(&job, &config).await?;
        saga.advance(SagaState::LocalCommitted)?;

        let outcome = self.remote.execute(&connection, &intent).await;
        saga.advance(SagaState::RemoteAttempted)?;

        match outcome {
            Ok(_) => {
                saga.advance(SagaState::Succeeded)?;
                info!(job_id = %job.id, job_name = %job.name, kind = %job.kind, "job created");
                Ok(saga.receipt(Some(history.version)))
            }
            Err(remote) => self.compensate_create(saga, remote).await,
        }
    }

    async fn compensate_create(
        &self,
        mut saga: Saga,
        remote: SyncError,
    ) -> Result<SyncReceipt, SagaError> {
        let job_id = saga.job_id();
        warn!(job_id = %job_id, error = %remote, "remote create failed, compensating");
        saga.advance(SagaState::Compensating)?;

        match self.jobs.purge(job_id).await {
            Ok(removed) => {
                if !removed {
                    debug!(job_id = %job_id, "job already absent during compensation");
                }
                saga.advance(SagaState::Compensated)?;
                Err(SagaError::Remote {
                    job_id,
                    operation: SyncOperation::Create,
                    state: SagaState::Compensated,
                    source: remote,
                })
            }
            Err(cause) => {
                saga.advance(SagaState::CompensationFailed)?;
                error!(
                    job_id = %job_id,
                    remote_error = %remote,
                    cleanup_error = %cause,
                    "compensation failed, local job has no remote counterpart"
                );
                Err(CompensationError { job_id, remote, cause }.into())
            }
        }
    }

    async fn run_update(&self, update: JobUpdate) -> Result<SyncReceipt, SagaError> {
        let job = self.live_job(update.job_id).await?;
        update.spec.validate_for(job.kind)?;
        let connection = self.connection(job.connection_id).await?;

        let saga = Saga::begin(job.id, SyncOperation::Update);
        let fetch = intents::fetch_config(&connection, &job, SyncOperation::Update);
        let original = self.remote.execute(&connection, &fetch).await.map_err(|source| {
            warn!(job_id = %job.id, error = %source, "fetching remote config failed, nothing written");
            SagaError::Remote {
                job_id: job.id,
                operation: SyncOperation::Update,
                state: saga.state(),
                source,
            }
        })?;

        let fragment =
            self.templates.render(job.kind.patch_template(), &job_context(&update.spec))?;
        let merged =
            self.merger.merge(&original, &wrap_patch(&fragment), job.kind.controlled_tags())?;

        self.commit_and_push(saga, &connection, &job, update, merged).await
    }

    async fn commit_and_push(
        &self,
        mut saga: Saga,
        connection: &RemoteConnection,
        job: &JobDefinition,
        update: JobUpdate,
        merged: String,
    ) -> Result<SyncReceipt, SagaError> {
        let history = self
            .jobs
            .update_with_history(job.id, &update.spec, &merged, Utc::now().timestamp())
            .await?;
        saga.advance(SagaState::LocalCommitted)?;
        debug!(job_id = %job.id, version = history.version, "recorded job version");

        let push = intents::push_config(connection, job, SyncOperation::Update, merged);
        let outcome = self.remote.execute(connection, &push).await;
        finish_after_commit(saga, outcome, Some(history.version))
    }

    async fn run_delete(&self, job_id: Uuid, mode: DeleteMode) -> Result<SyncReceipt, SagaError> {
        let job = self.live_job(job_id).await?;
        let connection = self.connection(job.connection_id).await?;
        let intent = intents::delete_item(&connection, &job);

        let mut saga = Saga::begin(job.id, SyncOperation::Delete);
        if !self.jobs.delete(job.id, mode, Utc::now().timestamp()).await? {
            return Err(JobSyncError::NotFound(format!("job {job_id}")).into());
        }
        saga.advance(SagaState::LocalCommitted)?;
        debug!(job_id = %job.id, mode = %mode, "job deleted locally");

        let outcome = match self.remote.execute(&connection, &intent).await {
            Err(SyncError::NotFound) => {
                info!(job_id = %job.id, job_name = %job.name, "remote job already absent");
                Ok(String::new())
            }
            other => other,
        };
        finish_after_commit(saga, outcome, None)
    }

    async fn run_rollback(&self, history_id: Uuid) -> Result<SyncReceipt, SagaError> {
        let entry = self
            .history
            .find(history_id)
            .await?
            .ok_or_else(|| JobSyncError::NotFound(format!("history entry {history_id}")))?;
        let job = self.live_job(entry.job_id).await?;
        let connection = self.connection(job.connection_id).await?;

        let mut saga = Saga::begin(job.id, SyncOperation::Rollback);
        let restored = self.jobs.restore_from_history(&entry, Utc::now().timestamp()).await?;
        saga.advance(SagaState::LocalCommitted)?;
        debug!(job_id = %job.id, version = entry.version, "job fields restored");

        let push = intents::push_config(&connection, &restored, SyncOperation::Rollback, entry.config);
        let outcome = self.remote.execute(&connection, &push).await;
        finish_after_commit(saga, outcome, Some(entry.version))
    }

    async fn live_job(&self, job_id: Uuid) -> Result<JobDefinition, JobSyncError> {
        self.jobs
            .find_live(job_id)
            .await?
            .ok_or_else(|| JobSyncError::NotFound(format!("job {job_id}")))
    }

    async fn connection(&self, connection_id: Uuid) -> Result<RemoteConnection, JobSyncError> {
        self.connections
            .find(connection_id)
            .await?
            .ok_or_else(|| JobSyncError::NotFound(format!("remote connection {connection_id}")))
    }
}

/// Close a saga whose local state is committed and is never compensated.
fn finish_after_commit(
    mut saga: Saga,
    outcome: Result<String, SyncError>,
    version: Option<i64>,
) -> Result<SyncReceipt, SagaError> {
    saga.advance(SagaState::RemoteAttempted)?;
    match outcome {
        Ok(_) => {
            saga.advance(SagaState::Succeeded)?;
            info!(job_id = %saga.job_id(), operation = %saga.operation(), "job synchronized");
            Ok(saga.receipt(version))
        }
        Err(source) => {
            warn!(
                job_id = %saga.job_id(),
                operation = %saga.operation(),
                error = %source,
                "remote call failed after local commit, local state kept"
            );
            Err(SagaError::Remote {
                job_id: saga.job_id(),
                operation: saga.operation(),
                state: saga.state(),
                source,
            })
        }
    }
}

/// Run a saga on its own task so caller cancellation cannot interrupt it.
async fn detach<F>(saga: F) -> Result<SyncReceipt, SagaError>
where
    F: Future<Output = Result<SyncReceipt, SagaError>> + Send + 'static,
{
    tokio::spawn(saga).await.map_err(|e| SagaError::Aborted(e.to_string()))?
}
