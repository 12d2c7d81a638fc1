//! Saga state tracking

use jobsync_domain::{JobSyncError, Result, SagaState, SyncOperation, SyncReceipt};
use tracing::info;
use uuid::Uuid;

/// Tracks one saga through its state machine, logging every transition.
#[derive(Debug, Clone)]
pub struct Saga {
    job_id: Uuid,
    operation: SyncOperation,
    transitions: Vec<SagaState>,
}

impl Saga {
    /// Start a saga in `Pending`.
    #[must_use]
    pub fn begin(job_id: Uuid, operation: SyncOperation) -> Self {
        info!(job_id = %job_id, operation = %operation, state = %SagaState::Pending, "saga started");
        Self { job_id, operation, transitions: vec![SagaState::Pending] }
    }

    /// Job the saga acts on.
    #[must_use]
    pub const fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Operation the saga performs.
    #[must_use]
    pub const fn operation(&self) -> SyncOperation {
        self.operation
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SagaState {
        self.transitions.last().copied().unwrap_or(SagaState::Pending)
    }

    /// Move to `next`, rejecting transitions the state machine forbids.
    ///
    /// # Errors
    ///
    /// Returns [`JobSyncError::Internal`] for a forbidden transition.
    pub fn advance(&mut self, next: SagaState) -> Result<()> {
        let from = self.state();
        if !from.can_transition_to(next) {
            return Err(JobSyncError::Internal(format!(
                "invalid saga transition {from} -> {next} for job {}",
                self.job_id
            )));
        }
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            from = %from,
            to = %next,
            "saga transition"
        );
        self.transitions.push(next);
        Ok(())
    }

    /// Receipt of a saga that reached `Succeeded`.
    #[must_use]
    pub fn receipt(self, version: Option<i64>) -> SyncReceipt {
        SyncReceipt {
            job_id: self.job_id,
            operation: self.operation,
            version,
            transitions: self.transitions,
        }
    }
}
