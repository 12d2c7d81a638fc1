//! Application context - dependency injection container

use std::sync::Arc;

use jobsync_common::SecretCipher;
use jobsync_core::{
    ConfigTemplateEngine, ConnectionRepository, ConnectionService, JobHistoryRepository,
    JobRepository, JobService, PipelineScriptService, RemoteJobClient, RepositoryInspector,
    SyncCoordinator,
};
use jobsync_domain::{AppConfig, JobSyncError, Result};
use tracing::info;

use crate::database::{
    DbManager, SqliteConnectionRepository, SqliteHistoryRepository, SqliteJobRepository,
};
use crate::errors::InfraError;
use crate::remote::{GithubRepositoryInspector, JenkinsClient};

/// Fully wired services sharing one database pool and one cipher.
pub struct AppContext {
    pub config: AppConfig,
    pub db: Arc<DbManager>,
    pub coordinator: SyncCoordinator,
    pub jobs: JobService,
    pub connections: ConnectionService,
    pub scripts: PipelineScriptService,
}

impl AppContext {
    /// Open the database, run migrations, load templates and wire services.
    ///
    /// # Errors
    /// `JobSyncError::Config` when the encryption key is missing or invalid
    /// or templates fail to load; database errors from opening the store.
    pub fn new(config: AppConfig) -> Result<Self> {
        let cipher = Arc::new(cipher_from_config(&config)?);
        let db = Arc::new(DbManager::open(&config.database)?);
        let templates = Arc::new(
            ConfigTemplateEngine::from_config(&config.templates)
                .map_err(|e| JobSyncError::Config(e.to_string()))?,
        );
        let remote: Arc<dyn RemoteJobClient> =
            Arc::new(JenkinsClient::from_config(&config.remote, Arc::clone(&cipher))?);
        let inspector: Arc<dyn RepositoryInspector> =
            Arc::new(GithubRepositoryInspector::from_config(&config.github, &config.remote)?);

        Ok(Self::with_remote(config, db, cipher, templates, remote, inspector))
    }

    /// Wire services over an already opened database and caller-supplied
    /// remote clients.
    #[must_use]
    pub fn with_remote(
        config: AppConfig,
        db: Arc<DbManager>,
        cipher: Arc<SecretCipher>,
        templates: Arc<ConfigTemplateEngine>,
        remote: Arc<dyn RemoteJobClient>,
        inspector: Arc<dyn RepositoryInspector>,
    ) -> Self {
        let jobs: Arc<dyn JobRepository> = Arc::new(SqliteJobRepository::new(Arc::clone(&db)));
        let history: Arc<dyn JobHistoryRepository> =
            Arc::new(SqliteHistoryRepository::new(Arc::clone(&db)));
        let connections: Arc<dyn ConnectionRepository> =
            Arc::new(SqliteConnectionRepository::new(Arc::clone(&db)));

        let coordinator = SyncCoordinator::new(
            Arc::clone(&jobs),
            Arc::clone(&history),
            Arc::clone(&connections),
            remote,
            Arc::clone(&templates),
        );

        info!(db_path = %db.path().display(), "application context ready");

        Self {
            config,
            db,
            coordinator,
            jobs: JobService::new(jobs, history),
            connections: ConnectionService::new(connections, cipher),
            scripts: PipelineScriptService::new(inspector, templates),
        }
    }
}

fn cipher_from_config(config: &AppConfig) -> Result<SecretCipher> {
    let key = config.encryption.key.as_deref().ok_or_else(|| {
        JobSyncError::Config("encryption key is not configured (JOBSYNC_ENCRYPTION_KEY)".into())
    })?;
    SecretCipher::from_base64_key(key).map_err(|e| InfraError::from(e).into())
}

#[cfg(test)]
mod tests {
    use zeroize::Zeroizing;

    use super::*;

    #[test]
    fn missing_encryption_key_is_config_error() {
        let result = AppContext::new(AppConfig::default());
        assert!(matches!(result, Err(JobSyncError::Config(msg)) if msg.contains("encryption key")));
    }

    #[test]
    fn short_encryption_key_is_config_error() {
        let mut config = AppConfig::default();
        config.encryption.key = Some(Zeroizing::new("c2hvcnQ=".into()));
        assert!(matches!(cipher_from_config(&config), Err(JobSyncError::Config(_))));
    }
}
