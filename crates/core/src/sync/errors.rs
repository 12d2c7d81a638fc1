//! Sync-specific error types
//!
//! Classifies remote failures and wraps them with the saga state reached
//! when they happened.

use jobsync_common::CryptoError;
use jobsync_domain::{JobSyncError, SagaState, SyncOperation};
use thiserror::Error;
use uuid::Uuid;

use crate::merge::MergeError;
use crate::template::TemplateError;

/// Longest response body excerpt kept in an error.
const MAX_BODY_EXCERPT: usize = 512;

/// Categories of remote failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorCategory {
    /// 401/403
    Authentication,
    /// 404
    NotFound,
    /// 408/504 or a transport timeout
    Timeout,
    /// Other 5xx
    Server,
    /// Other 4xx
    Client,
    /// Connection refused, DNS, TLS and other transport errors
    Network,
    /// Stored secret could not be decrypted
    Credentials,
}

/// Failure of a single remote call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Remote answered 401 or 403.
    #[error("Authentication failed (HTTP {status})")]
    AuthFailed { status: u16 },

    /// Remote answered 404.
    #[error("Remote job not found")]
    NotFound,

    /// Transport timeout, or a 408/504 answer.
    #[error("Remote call timed out")]
    Timeout,

    /// Any other 5xx, with an excerpt of the body.
    #[error("Remote server error (HTTP {status}): {body}")]
    RemoteServerError { status: u16, body: String },

    /// Any other 4xx, with an excerpt of the body.
    #[error("Remote client error (HTTP {status}): {body}")]
    RemoteClientError { status: u16, body: String },

    /// Connection, TLS or body-read failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The stored connection secret could not be decrypted.
    #[error("Credential decryption failed: {0}")]
    Credentials(#[from] CryptoError),
}

impl SyncError {
    /// Map a non-2xx HTTP status to an error; `None` for success.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Option<Self> {
        let body = excerpt(body);
        match status {
            200..=299 => None,
            401 | 403 => Some(Self::AuthFailed { status }),
            404 => Some(Self::NotFound),
            408 | 504 => Some(Self::Timeout),
            500..=599 => Some(Self::RemoteServerError { status, body }),
            _ => Some(Self::RemoteClientError { status, body }),
        }
    }

    /// Get the error category for this error
    #[must_use]
    pub const fn category(&self) -> SyncErrorCategory {
        match self {
            Self::AuthFailed { .. } => SyncErrorCategory::Authentication,
            Self::NotFound => SyncErrorCategory::NotFound,
            Self::Timeout => SyncErrorCategory::Timeout,
            Self::RemoteServerError { .. } => SyncErrorCategory::Server,
            Self::RemoteClientError { .. } => SyncErrorCategory::Client,
            Self::Network(_) => SyncErrorCategory::Network,
            Self::Credentials(_) => SyncErrorCategory::Credentials,
        }
    }
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}

/// Remote create failed and the local rows could not be removed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("compensation failed for job {job_id}: remote error: {remote}; cleanup error: {cause}")]
pub struct CompensationError {
    pub job_id: Uuid,
    pub remote: SyncError,
    pub cause: JobSyncError,
}

/// Any way a saga can end short of `Succeeded`.
#[derive(Debug, Error)]
pub enum SagaError {
    /// Rendering failed; nothing was written.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The remote configuration could not be merged; nothing was written.
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Validation, lookup or local storage failure.
    #[error(transparent)]
    Store(#[from] JobSyncError),

    /// The remote call failed; `state` is where the saga stopped.
    #[error("{operation} of job {job_id} failed remotely in state {state}: {source}")]
    Remote {
        job_id: Uuid,
        operation: SyncOperation,
        state: SagaState,
        #[source]
        source: SyncError,
    },

    /// A failed create could not be undone locally.
    #[error(transparent)]
    Compensation(#[from] CompensationError),

    /// The detached saga task panicked or was cancelled by the runtime.
    #[error("Saga task aborted: {0}")]
    Aborted(String),
}

impl SagaError {
    /// State the saga was left in, when it got far enough to have one.
    #[must_use]
    pub fn final_state(&self) -> Option<SagaState> {
        match self {
            Self::Remote { state, .. } => Some(*state),
            Self::Compensation(_) => Some(SagaState::CompensationFailed),
            Self::Template(_) | Self::Merge(_) | Self::Store(_) | Self::Aborted(_) => None,
        }
    }

    /// Underlying remote failure, if any.
    #[must_use]
    pub const fn remote_error(&self) -> Option<&SyncError> {
        match self {
            Self::Remote { source, .. } => Some(source),
            Self::Compensation(err) => Some(&err.remote),
            _ => None,
        }
    }
}
