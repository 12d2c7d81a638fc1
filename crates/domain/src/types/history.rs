//! Version ledger rows

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::job::JobSpec;

/// Immutable snapshot of a job at one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHistory {
    pub id: Uuid,
    pub job_id: Uuid,
    pub version: i64,
    /// Full rendered XML pushed (or about to be pushed) to the remote server.
    pub config: String,
    pub job_name: String,
    #[serde(flatten)]
    pub spec: JobSpec,
    pub created_at: i64,
}

/// Light listing entry used by history views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub id: Uuid,
    pub version: i64,
    pub created_at: i64,
}

impl From<&JobHistory> for HistorySummary {
    fn from(history: &JobHistory) -> Self {
        Self { id: history.id, version: history.version, created_at: history.created_at }
    }
}
