//! In-memory repository implementations for testing
//!
//! One shared store implements every storage port so tests can inspect jobs
//! and history after a saga has run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jobsync_core::ledger;
use jobsync_core::{ConnectionRepository, JobHistoryRepository, JobRepository};
use jobsync_domain::{
    DeleteMode, HistorySummary, JobDefinition, JobHistory, JobSpec, JobSyncError,
    RemoteConnection, Result as DomainResult,
};
use uuid::Uuid;

#[derive(Default)]
struct State {
    jobs: HashMap<Uuid, JobDefinition>,
    history: Vec<JobHistory>,
    connections: HashMap<Uuid, RemoteConnection>,
}

/// In-memory store shared by clones.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    fail_purge: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn add_connection(&self, connection: RemoteConnection) {
        self.state.lock().unwrap().connections.insert(connection.id, connection);
    }

    /// Make every subsequent `purge` fail.
    pub fn fail_purges(&self) {
        self.fail_purge.store(true, Ordering::SeqCst);
    }

    pub fn job_count(&self) -> usize {
        self.state.lock().unwrap().jobs.len()
    }

    pub fn history_count(&self) -> usize {
        self.state.lock().unwrap().history.len()
    }

    pub fn job(&self, id: Uuid) -> Option<JobDefinition> {
        self.state.lock().unwrap().jobs.get(&id).cloned()
    }

    pub fn only_job(&self) -> JobDefinition {
        let state = self.state.lock().unwrap();
        assert_eq!(state.jobs.len(), 1, "expected exactly one job");
        state.jobs.values().next().cloned().unwrap()
    }

    pub fn versions(&self, job_id: Uuid) -> Vec<i64> {
        let state = self.state.lock().unwrap();
        let mut versions: Vec<i64> =
            state.history.iter().filter(|h| h.job_id == job_id).map(|h| h.version).collect();
        versions.sort_unstable();
        versions
    }
}

fn latest_version(state: &State, job_id: Uuid) -> Option<i64> {
    state.history.iter().filter(|h| h.job_id == job_id).map(|h| h.version).max()
}

#[async_trait]
impl JobRepository for InMemoryStore {
    async fn insert_with_history(&self, job: &JobDefinition, config: &str) -> DomainResult<JobHistory> {
        let mut state = self.state.lock().unwrap();
        let history = ledger::snapshot(job, ledger::next_version(None), config, job.created_at);
        state.jobs.insert(job.id, job.clone());
        state.history.push(history.clone());
        Ok(history)
    }

    async fn update_with_history(
        &self,
        job_id: Uuid,
        spec: &JobSpec,
        config: &str,
        now: i64,
    ) -> DomainResult<JobHistory> {
        let mut state = self.state.lock().unwrap();
        let version = ledger::next_version(latest_version(&state, job_id));
        let job = state
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| JobSyncError::NotFound(format!("job {job_id}")))?;
        job.spec = spec.clone();
        job.updated_at = now;
        let history = ledger::snapshot(job, version, config, now);
        state.history.push(history.clone());
        Ok(history)
    }

    async fn restore_from_history(&self, history: &JobHistory, now: i64) -> DomainResult<JobDefinition> {
        let mut state = self.state.lock().unwrap();
        let job = state
            .jobs
            .get_mut(&history.job_id)
            .ok_or_else(|| JobSyncError::NotFound(format!("job {}", history.job_id)))?;
        job.spec = history.spec.clone();
        job.updated_at = now;
        Ok(job.clone())
    }

    async fn delete(&self, job_id: Uuid, mode: DeleteMode, now: i64) -> DomainResult<bool> {
        let mut state = self.state.lock().unwrap();
        match mode {
            DeleteMode::Soft => Ok(state
                .jobs
                .get_mut(&job_id)
                .filter(|job| !job.is_deleted)
                .map(|job| {
                    job.is_deleted = true;
                    job.deleted_at = Some(now);
                })
                .is_some()),
            DeleteMode::Hard => {
                let removed = state.jobs.remove(&job_id).is_some();
                state.history.retain(|h| h.job_id != job_id);
                Ok(removed)
            }
        }
    }

    async fn purge(&self, job_id: Uuid) -> DomainResult<bool> {
        if self.fail_purge.load(Ordering::SeqCst) {
            return Err(JobSyncError::Database("database is locked".into()));
        }
        let mut state = self.state.lock().unwrap();
        let removed = state.jobs.remove(&job_id).is_some();
        state.history.retain(|h| h.job_id != job_id);
        Ok(removed)
    }

    async fn find_live(&self, job_id: Uuid) -> DomainResult<Option<JobDefinition>> {
        Ok(self.job(job_id).filter(|job| !job.is_deleted))
    }

    async fn find_by_name(&self, connection_id: Uuid, name: &str) -> DomainResult<Option<JobDefinition>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .jobs
            .values()
            .find(|job| job.connection_id == connection_id && job.name == name && !job.is_deleted)
            .cloned())
    }

    async fn list_by_connection(&self, connection_id: Uuid) -> DomainResult<Vec<JobDefinition>> {
        let state = self.state.lock().unwrap();
        let mut jobs: Vec<JobDefinition> = state
            .jobs
            .values()
            .filter(|job| job.connection_id == connection_id && !job.is_deleted)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(jobs)
    }
}

#[async_trait]
impl JobHistoryRepository for InMemoryStore {
    async fn list(&self, job_id: Uuid) -> DomainResult<Vec<HistorySummary>> {
        let state = self.state.lock().unwrap();
        let mut entries: Vec<HistorySummary> =
            state.history.iter().filter(|h| h.job_id == job_id).map(HistorySummary::from).collect();
        entries.sort_by_key(|entry| entry.version);
        Ok(entries)
    }

    async fn find(&self, history_id: Uuid) -> DomainResult<Option<JobHistory>> {
        let state = self.state.lock().unwrap();
        Ok(state.history.iter().find(|h| h.id == history_id).cloned())
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryStore {
    async fn save(&self, connection: &RemoteConnection) -> DomainResult<()> {
        self.add_connection(connection.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> DomainResult<Option<RemoteConnection>> {
        Ok(self.state.lock().unwrap().connections.get(&id).cloned())
    }
}
