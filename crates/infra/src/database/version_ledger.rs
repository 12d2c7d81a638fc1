//! SQL side of the version ledger
//!
//! All functions take a connection (or a transaction, which derefs to one)
//! so the ledger write shares the transaction of the job write it records.
//! History rows are never updated; they disappear only through the
//! `ON DELETE CASCADE` of their job.

use jobsync_core::ledger;
use jobsync_domain::{HistorySummary, JobDefinition, JobHistory, Result as DomainResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::manager::map_sql_error;
use super::rows::{bool_to_int, spec_at, uuid_at};

const LATEST_VERSION_SQL: &str = "SELECT MAX(version) FROM job_history WHERE job_id = ?1";

const INSERT_HISTORY_SQL: &str = "INSERT INTO job_history (
        id, job_id, version, config, job_name, description, project_url, project_display_name,
        github_trigger, repository_url, branch, script, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";

const LIST_HISTORY_SQL: &str =
    "SELECT id, version, created_at FROM job_history WHERE job_id = ?1 ORDER BY version ASC";

const FIND_HISTORY_SQL: &str = "SELECT
        id, job_id, version, config, job_name, description, project_url, project_display_name,
        github_trigger, repository_url, branch, script, created_at
    FROM job_history WHERE id = ?1";

/// Highest recorded version of a job, if any.
pub fn latest_version(conn: &Connection, job_id: Uuid) -> DomainResult<Option<i64>> {
    conn.query_row(LATEST_VERSION_SQL, params![job_id.to_string()], |row| row.get(0))
        .map_err(map_sql_error)
}

/// `max(version) + 1`, or 1 for a job without history.
pub fn next_version(conn: &Connection, job_id: Uuid) -> DomainResult<i64> {
    Ok(ledger::next_version(latest_version(conn, job_id)?))
}

/// Insert one history row. A version already taken for the job fails with
/// `JobSyncError::Conflict` through the `UNIQUE(job_id, version)` constraint.
pub fn record(conn: &Connection, history: &JobHistory) -> DomainResult<()> {
    let spec = &history.spec;
    conn.execute(
        INSERT_HISTORY_SQL,
        params![
            history.id.to_string(),
            history.job_id.to_string(),
            history.version,
            history.config,
            history.job_name,
            spec.description,
            spec.project_url,
            spec.project_display_name,
            bool_to_int(spec.github_trigger),
            spec.repository_url,
            spec.branch,
            spec.script,
            history.created_at,
        ],
    )
    .map(|_| ())
    .map_err(map_sql_error)
}

/// Snapshot `job` under the next version and record it.
pub fn append(
    conn: &Connection,
    job: &JobDefinition,
    config: &str,
    now: i64,
) -> DomainResult<JobHistory> {
    let version = next_version(conn, job.id)?;
    let history = ledger::snapshot(job, version, config, now);
    record(conn, &history)?;
    Ok(history)
}

/// History entries of a job ordered by version.
pub fn list(conn: &Connection, job_id: Uuid) -> DomainResult<Vec<HistorySummary>> {
    let mut stmt = conn.prepare(LIST_HISTORY_SQL).map_err(map_sql_error)?;
    let rows = stmt
        .query_map(params![job_id.to_string()], |row| {
            Ok(HistorySummary { id: uuid_at(row, 0)?, version: row.get(1)?, created_at: row.get(2)? })
        })
        .map_err(map_sql_error)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
}

/// Full history entry by id.
pub fn find(conn: &Connection, history_id: Uuid) -> DomainResult<Option<JobHistory>> {
    conn.query_row(FIND_HISTORY_SQL, params![history_id.to_string()], map_history_row)
        .optional()
        .map_err(map_sql_error)
}

fn map_history_row(row: &Row<'_>) -> rusqlite::Result<JobHistory> {
    Ok(JobHistory {
        id: uuid_at(row, 0)?,
        job_id: uuid_at(row, 1)?,
        version: row.get(2)?,
        config: row.get(3)?,
        job_name: row.get(4)?,
        spec: spec_at(row, 5)?,
        created_at: row.get(12)?,
    })
}
