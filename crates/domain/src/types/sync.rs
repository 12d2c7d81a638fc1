//! Synchronization saga types
//!
//! A saga moves through
//!
//! ```text
//! Pending -> LocalCommitted -> RemoteAttempted -> Succeeded
//!                                              -> Compensating -> Compensated
//!                                                              -> CompensationFailed
//! ```
//!
//! A saga that stops in `Pending` never wrote locally; one that stops in
//! `RemoteAttempted` committed locally, failed remotely and was not
//! compensated (update, delete and rollback flows).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_domain_status_conversions;

/// Kind of change being synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
    Rollback,
}

impl_domain_status_conversions!(SyncOperation {
    Create => "create",
    Update => "update",
    Delete => "delete",
    Rollback => "rollback",
});

/// Saga lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaState {
    Pending,
    LocalCommitted,
    RemoteAttempted,
    Succeeded,
    Compensating,
    Compensated,
    CompensationFailed,
}

impl_domain_status_conversions!(SagaState {
    Pending => "pending",
    LocalCommitted => "local_committed",
    RemoteAttempted => "remote_attempted",
    Succeeded => "succeeded",
    Compensating => "compensating",
    Compensated => "compensated",
    CompensationFailed => "compensation_failed",
});

impl SagaState {
    /// Whether the state machine permits moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::LocalCommitted)
                | (Self::LocalCommitted, Self::RemoteAttempted)
                | (Self::RemoteAttempted, Self::Succeeded | Self::Compensating)
                | (Self::Compensating, Self::Compensated | Self::CompensationFailed)
        )
    }

    /// States with no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Compensated | Self::CompensationFailed)
    }
}

/// HTTP method of a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpVerb {
    Get,
    Post,
}

/// Request body carried by a [`SyncIntent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", content = "content", rename_all = "snake_case")]
pub enum IntentBody {
    /// No body at all.
    None,
    /// `application/xml` document.
    Xml(String),
    /// Empty `application/x-www-form-urlencoded` body.
    Form,
}

/// Remote call prepared during the local transaction and executed after
/// commit. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncIntent {
    pub job_id: Uuid,
    pub job_name: String,
    pub operation: SyncOperation,
    pub method: HttpVerb,
    pub url: String,
    pub body: IntentBody,
}

/// Result of a saga that ended in [`SagaState::Succeeded`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReceipt {
    pub job_id: Uuid,
    pub operation: SyncOperation,
    /// Version recorded by this saga, if it wrote history.
    pub version: Option<i64>,
    /// Every state the saga visited, starting with `Pending`.
    pub transitions: Vec<SagaState>,
}
