//! Version ledger rules
//!
//! History rows are append-only. Versions start at 1 and each write takes
//! `max + 1` inside the transaction that changes the job; storage enforces
//! `UNIQUE(job_id, version)` so two writers can never share a version.

use jobsync_domain::{HistorySummary, JobDefinition, JobHistory, JobSyncError, Result};
use uuid::Uuid;

/// Version assigned to the first history row of a job.
pub const FIRST_VERSION: i64 = 1;

/// Version following the latest recorded one.
#[must_use]
pub fn next_version(latest: Option<i64>) -> i64 {
    latest.map_or(FIRST_VERSION, |version| version + 1)
}

/// History row capturing `job` as rendered into `config`.
#[must_use]
pub fn snapshot(job: &JobDefinition, version: i64, config: &str, now: i64) -> JobHistory {
    JobHistory {
        id: Uuid::new_v4(),
        job_id: job.id,
        version,
        config: config.to_string(),
        job_name: job.name.clone(),
        spec: job.spec.clone(),
        created_at: now,
    }
}

/// Check that `entries` (ordered by version) form the gapless run 1, 2, 3, ...
///
/// # Errors
///
/// Returns [`JobSyncError::Internal`] at the first gap or duplicate.
pub fn verify_sequence(entries: &[HistorySummary]) -> Result<()> {
    for (expected, entry) in (FIRST_VERSION..).zip(entries) {
        if entry.version != expected {
            return Err(JobSyncError::Internal(format!(
                "history {} has version {}, expected {expected}",
                entry.id, entry.version
            )));
        }
    }
    Ok(())
}
