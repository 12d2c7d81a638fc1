//! Connection registration service

use std::sync::Arc;

use chrono::Utc;
use jobsync_common::SecretCipher;
use jobsync_domain::{JobSyncError, NewRemoteConnection, RemoteConnection, Result};
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::jobs::ports::ConnectionRepository;

/// Registers remote servers, storing their secrets encrypted.
pub struct ConnectionService {
    repository: Arc<dyn ConnectionRepository>,
    cipher: Arc<SecretCipher>,
}

impl ConnectionService {
    /// Service storing connections in `repository`, encrypting secrets with `cipher`.
    #[must_use]
    pub fn new(repository: Arc<dyn ConnectionRepository>, cipher: Arc<SecretCipher>) -> Self {
        Self { repository, cipher }
    }

    /// Validate and store a connection. The plaintext secret is encrypted
    /// before it leaves this function.
    ///
    /// # Errors
    ///
    /// Returns [`JobSyncError::InvalidInput`] for a blank name or principal
    /// or a base URI that is not http(s), [`JobSyncError::Security`] when
    /// encryption fails, and repository errors from the save.
    pub async fn register(&self, request: NewRemoteConnection) -> Result<RemoteConnection> {
        if request.name.trim().is_empty() {
            return Err(JobSyncError::InvalidInput("connection name must not be empty".into()));
        }
        if request.principal.trim().is_empty() {
            return Err(JobSyncError::InvalidInput("principal must not be empty".into()));
        }

        let base_uri = Url::parse(request.base_uri.trim())
            .map_err(|e| JobSyncError::InvalidInput(format!("invalid base URI: {e}")))?;
        if !matches!(base_uri.scheme(), "http" | "https") {
            return Err(JobSyncError::InvalidInput(format!(
                "unsupported base URI scheme '{}'",
                base_uri.scheme()
            )));
        }

        let encrypted_secret = self
            .cipher
            .encrypt(&request.secret)
            .map_err(|e| JobSyncError::Security(e.to_string()))?;

        let connection = RemoteConnection {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            description: request.description,
            base_uri: base_uri.as_str().trim_end_matches('/').to_string(),
            principal: request.principal,
            encrypted_secret,
            created_at: Utc::now().timestamp(),
        };
        self.repository.save(&connection).await?;

        info!(connection_id = %connection.id, base_uri = %connection.base_uri, "remote connection registered");
        Ok(connection)
    }

    /// Connection by id
    ///
    /// # Errors
    ///
    /// Returns [`JobSyncError::NotFound`] when no connection has `id`.
    pub async fn get(&self, id: Uuid) -> Result<RemoteConnection> {
        self.repository
            .find(id)
            .await?
            .ok_or_else(|| JobSyncError::NotFound(format!("remote connection {id}")))
    }
}
