//! Port interfaces for sync operations

use async_trait::async_trait;
use jobsync_domain::{RemoteConnection, SyncIntent};

use super::errors::SyncError;

/// Executes one prepared remote call against a build server.
#[async_trait]
pub trait RemoteJobClient: Send + Sync {
    /// Perform `intent` with the connection's credentials and return the
    /// response body of a 2xx reply. Exactly one attempt is made.
    async fn execute(
        &self,
        connection: &RemoteConnection,
        intent: &SyncIntent,
    ) -> Result<String, SyncError>;
}
