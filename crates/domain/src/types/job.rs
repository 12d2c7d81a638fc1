//! Job definition types
//!
//! A job definition is the local record of a CI job that also lives on the
//! remote build server. Freestyle and pipeline jobs share one table; the
//! `kind` column selects which templates and controlled tags apply.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{JobSyncError, Result};
use crate::impl_domain_status_conversions;

/// Flavour of remote job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Freestyle project with SCM checkout and a shell build step.
    Freestyle,
    /// Declarative pipeline whose script is embedded in the job config.
    Pipeline,
}

impl_domain_status_conversions!(JobKind {
    Freestyle => "freestyle",
    Pipeline => "pipeline",
});

/// Caller-supplied fields rendered into the remote configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobSpec {
    pub description: String,
    pub project_url: String,
    pub project_display_name: String,
    /// Whether the GitHub push webhook trigger is enabled.
    pub github_trigger: bool,
    /// Source repository; freestyle jobs only.
    pub repository_url: Option<String>,
    /// Branch specifier for the SCM block; freestyle jobs only.
    pub branch: Option<String>,
    /// Shell build step (freestyle) or pipeline script (pipeline).
    pub script: String,
}

impl JobSpec {
    /// Check the fields a job of `kind` cannot do without.
    ///
    /// # Errors
    ///
    /// Returns [`JobSyncError::InvalidInput`] for a pipeline with an empty script.
    pub fn validate_for(&self, kind: JobKind) -> Result<()> {
        if kind == JobKind::Pipeline && self.script.trim().is_empty() {
            return Err(JobSyncError::InvalidInput("pipeline script must not be empty".into()));
        }
        Ok(())
    }
}

/// Persisted job definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub name: String,
    pub kind: JobKind,
    #[serde(flatten)]
    pub spec: JobSpec,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

/// Request to create a job on a remote connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub connection_id: Uuid,
    pub name: String,
    pub kind: JobKind,
    #[serde(flatten)]
    pub spec: JobSpec,
}

impl NewJob {
    /// Reject names the remote server cannot address and empty pipelines.
    ///
    /// # Errors
    ///
    /// Returns [`JobSyncError::InvalidInput`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        validate_job_name(&self.name)?;
        self.spec.validate_for(self.kind)
    }

    /// Materialise the definition that phase one of the create saga inserts.
    #[must_use]
    pub fn into_definition(self, id: Uuid, now: i64) -> JobDefinition {
        JobDefinition {
            id,
            connection_id: self.connection_id,
            name: self.name,
            kind: self.kind,
            spec: self.spec,
            is_deleted: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Replacement field set for an existing job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobUpdate {
    pub job_id: Uuid,
    #[serde(flatten)]
    pub spec: JobSpec,
}

/// How a job is removed from the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    /// Flag the row as deleted and keep its history.
    Soft,
    /// Remove the row; history cascades.
    Hard,
}

impl_domain_status_conversions!(DeleteMode {
    Soft => "soft",
    Hard => "hard",
});

fn validate_job_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(JobSyncError::InvalidInput("job name must not be empty".into()));
    }
    if name != name.trim() {
        return Err(JobSyncError::InvalidInput(format!(
            "job name '{name}' has leading or trailing whitespace"
        )));
    }
    if let Some(bad) = name.chars().find(|c| matches!(c, '/' | '\\' | '?' | '#' | '%' | '&')) {
        return Err(JobSyncError::InvalidInput(format!(
            "job name '{name}' contains unsupported character '{bad}'"
        )));
    }
    Ok(())
}
