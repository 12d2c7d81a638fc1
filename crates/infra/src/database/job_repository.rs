//! SQLite implementation of the job repository port.
//!
//! Writes that change a job's rendered configuration run in one
//! `BEGIN IMMEDIATE` transaction together with the version ledger insert,
//! so a job row never exists without its history and vice versa.

use std::sync::Arc;

use async_trait::async_trait;
use jobsync_core::JobRepository;
use jobsync_domain::{
    DeleteMode, JobDefinition, JobHistory, JobSpec, JobSyncError, Result as DomainResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::debug;
use uuid::Uuid;

use super::manager::{map_sql_error, run_blocking, DbManager};
use super::rows::{bool_to_int, enum_at, spec_at, uuid_at};
use super::version_ledger;

/// SQLite-backed job repository.
pub struct SqliteJobRepository {
    db: Arc<DbManager>,
}

impl SqliteJobRepository {
    /// Construct a repository backed by the shared manager.
    #[must_use]
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn insert_job(conn: &Connection, job: &JobDefinition) -> DomainResult<()> {
        let spec = &job.spec;
        conn.execute(
            JOB_INSERT_SQL,
            params![
                job.id.to_string(),
                job.connection_id.to_string(),
                job.name,
                job.kind.as_str(),
                spec.description,
                spec.project_url,
                spec.project_display_name,
                bool_to_int(spec.github_trigger),
                spec.repository_url,
                spec.branch,
                spec.script,
                bool_to_int(job.is_deleted),
                job.created_at,
                job.updated_at,
                job.deleted_at,
            ],
        )
        .map(|_| ())
        .map_err(map_sql_error)
    }

    fn update_spec(conn: &Connection, job_id: Uuid, spec: &JobSpec, now: i64) -> DomainResult<usize> {
        conn.execute(
            JOB_UPDATE_SPEC_SQL,
            params![
                spec.description,
                spec.project_url,
                spec.project_display_name,
                bool_to_int(spec.github_trigger),
                spec.repository_url,
                spec.branch,
                spec.script,
                now,
                job_id.to_string(),
            ],
        )
        .map_err(map_sql_error)
    }

    fn select_live(conn: &Connection, job_id: Uuid) -> DomainResult<Option<JobDefinition>> {
        conn.query_row(JOB_SELECT_LIVE_SQL, params![job_id.to_string()], map_job_row)
            .optional()
            .map_err(map_sql_error)
    }

    fn require_live(conn: &Connection, job_id: Uuid) -> DomainResult<JobDefinition> {
        Self::select_live(conn, job_id)?
            .ok_or_else(|| JobSyncError::NotFound(format!("job {job_id}")))
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn insert_with_history(&self, job: &JobDefinition, config: &str) -> DomainResult<JobHistory> {
        let job = job.clone();
        let config = config.to_string();

        run_blocking(&self.db, move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(map_sql_error)?;
            Self::insert_job(&tx, &job)?;
            let history = version_ledger::append(&tx, &job, &config, job.created_at)?;
            tx.commit().map_err(map_sql_error)?;

            debug!(job_id = %job.id, version = history.version, "job inserted");
            Ok(history)
        })
        .await
    }

    async fn update_with_history(
        &self,
        job_id: Uuid,
        spec: &JobSpec,
        config: &str,
        now: i64,
    ) -> DomainResult<JobHistory> {
        let spec = spec.clone();
        let config = config.to_string();

        run_blocking(&self.db, move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(map_sql_error)?;
            let mut job = Self::require_live(&tx, job_id)?;
            Self::update_spec(&tx, job_id, &spec, now)?;
            job.spec = spec;
            job.updated_at = now;

            let history = version_ledger::append(&tx, &job, &config, now)?;
            tx.commit().map_err(map_sql_error)?;

            debug!(job_id = %job_id, version = history.version, "job updated");
            Ok(history)
        })
        .await
    }

    async fn restore_from_history(&self, history: &JobHistory, now: i64) -> DomainResult<JobDefinition> {
        let history = history.clone();

        run_blocking(&self.db, move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(map_sql_error)?;
            if Self::update_spec(&tx, history.job_id, &history.spec, now)? == 0 {
                return Err(JobSyncError::NotFound(format!("job {}", history.job_id)));
            }
            let job = Self::require_live(&tx, history.job_id)?;
            tx.commit().map_err(map_sql_error)?;

            debug!(job_id = %job.id, version = history.version, "job restored from history");
            Ok(job)
        })
        .await
    }

    async fn delete(&self, job_id: Uuid, mode: DeleteMode, now: i64) -> DomainResult<bool> {
        run_blocking(&self.db, move |conn| {
            let affected = match mode {
                DeleteMode::Soft => conn.execute(JOB_SOFT_DELETE_SQL, params![now, job_id.to_string()]),
                DeleteMode::Hard => conn.execute(JOB_HARD_DELETE_SQL, params![job_id.to_string()]),
            }
            .map_err(map_sql_error)?;
            Ok(affected > 0)
        })
        .await
    }

    async fn purge(&self, job_id: Uuid) -> DomainResult<bool> {
        run_blocking(&self.db, move |conn| {
            let affected =
                conn.execute(JOB_PURGE_SQL, params![job_id.to_string()]).map_err(map_sql_error)?;
            Ok(affected > 0)
        })
        .await
    }

    async fn find_live(&self, job_id: Uuid) -> DomainResult<Option<JobDefinition>> {
        run_blocking(&self.db, move |conn| Self::select_live(conn, job_id)).await
    }

    async fn find_by_name(&self, connection_id: Uuid, name: &str) -> DomainResult<Option<JobDefinition>> {
        let name = name.to_string();
        run_blocking(&self.db, move |conn| {
            conn.query_row(JOB_SELECT_BY_NAME_SQL, params![connection_id.to_string(), name], map_job_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
    }

    async fn list_by_connection(&self, connection_id: Uuid) -> DomainResult<Vec<JobDefinition>> {
        run_blocking(&self.db, move |conn| {
            let mut stmt = conn.prepare(JOB_LIST_SQL).map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![connection_id.to_string()], map_job_row)
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
    }
}

macro_rules! job_select {
    ($tail:literal) => {
        concat!(
            "SELECT id, connection_id, name, kind, description, project_url,
                project_display_name, github_trigger, repository_url, branch, script,
                is_deleted, created_at, updated_at, deleted_at
            FROM job ",
            $tail
        )
    };
}

const JOB_INSERT_SQL: &str = "INSERT INTO job (
        id, connection_id, name, kind, description, project_url, project_display_name,
        github_trigger, repository_url, branch, script, is_deleted, created_at, updated_at,
        deleted_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)";

const JOB_UPDATE_SPEC_SQL: &str = "UPDATE job SET
        description = ?1, project_url = ?2, project_display_name = ?3, github_trigger = ?4,
        repository_url = ?5, branch = ?6, script = ?7, updated_at = ?8
    WHERE id = ?9 AND is_deleted = 0";

const JOB_SOFT_DELETE_SQL: &str = "UPDATE job SET is_deleted = 1, deleted_at = ?1, updated_at = ?1
    WHERE id = ?2 AND is_deleted = 0";

const JOB_HARD_DELETE_SQL: &str = "DELETE FROM job WHERE id = ?1 AND is_deleted = 0";

const JOB_PURGE_SQL: &str = "DELETE FROM job WHERE id = ?1";

const JOB_SELECT_LIVE_SQL: &str = job_select!("WHERE id = ?1 AND is_deleted = 0");

const JOB_SELECT_BY_NAME_SQL: &str =
    job_select!("WHERE connection_id = ?1 AND name = ?2 AND is_deleted = 0");

const JOB_LIST_SQL: &str =
    job_select!("WHERE connection_id = ?1 AND is_deleted = 0 ORDER BY name ASC");

fn map_job_row(row: &Row<'_>) -> rusqlite::Result<JobDefinition> {
    Ok(JobDefinition {
        id: uuid_at(row, 0)?,
        connection_id: uuid_at(row, 1)?,
        name: row.get(2)?,
        kind: enum_at(row, 3)?,
        spec: spec_at(row, 4)?,
        is_deleted: row.get::<_, i64>(11)? != 0,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
        deleted_at: row.get(14)?,
    })
}
