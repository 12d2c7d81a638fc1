//! Configuration loader
//!
//! Builds an [`AppConfig`] in three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. The file named by `JOBSYNC_CONFIG` (`.toml` or `.json`)
//! 3. Individual `JOBSYNC_*` environment variables
//!
//! A `.env` file in the working directory is read first, so its entries
//! behave like real environment variables.
//!
//! ## Environment Variables
//! - `JOBSYNC_CONFIG`: Path to a config file
//! - `JOBSYNC_DB_PATH`: Database file path
//! - `JOBSYNC_DB_POOL_SIZE`: Connection pool size
//! - `JOBSYNC_DB_ENCRYPTION_KEY`: SQLCipher passphrase
//! - `JOBSYNC_ENCRYPTION_KEY`: Base64 key for stored remote secrets
//! - `JOBSYNC_REMOTE_CONNECT_TIMEOUT_SECS`: Connect timeout
//! - `JOBSYNC_REMOTE_REQUEST_TIMEOUT_SECS`: Whole-request timeout
//! - `JOBSYNC_REMOTE_USER_AGENT`: User agent sent to the remote server
//! - `JOBSYNC_TEMPLATES_DIR`: Directory of template overrides
//! - `JOBSYNC_GITHUB_API_URL`: GitHub API base URL
//! - `JOBSYNC_GITHUB_TOKEN`: GitHub token for repository lookups
//! - `JOBSYNC_LOG_LEVEL`: Fallback log filter when `RUST_LOG` is unset
//! - `JOBSYNC_LOG_JSON`: Emit JSON log lines (true/false)

use std::path::Path;
use std::str::FromStr;

use jobsync_domain::{AppConfig, JobSyncError, Result};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::errors::InfraError;

pub const CONFIG_PATH_VAR: &str = "JOBSYNC_CONFIG";

/// Entry point for loading [`AppConfig`].
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `.env`, the config file and the environment.
    ///
    /// # Errors
    /// Returns `JobSyncError::Config` if the config file is missing or
    /// malformed, or an environment variable holds an unparsable value.
    pub fn load() -> Result<AppConfig> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(JobSyncError::Config(format!("invalid .env file: {e}"))),
        }

        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::load_from_file(Path::new(&path))?,
            Err(_) => AppConfig::default(),
        };
        Self::apply_env(&mut config)?;
        Ok(config)
    }

    /// Parse a config file, detecting the format from its extension.
    /// Fields the file omits keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `JobSyncError::Config` if the file is missing, unreadable or
    /// not valid TOML/JSON.
    pub fn load_from_file(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            return Err(JobSyncError::Config(format!("config file not found: {}", path.display())));
        }

        info!(path = %path.display(), "loading configuration from file");
        let contents = std::fs::read_to_string(path)
            .map_err(|e| JobSyncError::Config(format!("failed to read config file: {e}")))?;

        parse_config(&contents, path)
    }

    /// Overlay any `JOBSYNC_*` variables onto `config`.
    ///
    /// # Errors
    ///
    /// Returns `JobSyncError::Config` naming the variable that holds an
    /// unparsable number.
    pub fn apply_env(config: &mut AppConfig) -> Result<()> {
        if let Some(path) = env_string("JOBSYNC_DB_PATH") {
            config.database.path = path;
        }
        if let Some(size) = env_parse("JOBSYNC_DB_POOL_SIZE")? {
            config.database.pool_size = size;
        }
        if let Some(key) = env_string("JOBSYNC_DB_ENCRYPTION_KEY") {
            config.database.encryption_key = Some(Zeroizing::new(key));
        }
        if let Some(key) = env_string("JOBSYNC_ENCRYPTION_KEY") {
            config.encryption.key = Some(Zeroizing::new(key));
        }
        if let Some(secs) = env_parse("JOBSYNC_REMOTE_CONNECT_TIMEOUT_SECS")? {
            config.remote.connect_timeout_secs = secs;
        }
        if let Some(secs) = env_parse("JOBSYNC_REMOTE_REQUEST_TIMEOUT_SECS")? {
            config.remote.request_timeout_secs = secs;
        }
        if let Some(agent) = env_string("JOBSYNC_REMOTE_USER_AGENT") {
            config.remote.user_agent = agent;
        }
        if let Some(dir) = env_string("JOBSYNC_TEMPLATES_DIR") {
            config.templates.dir = Some(dir);
        }
        if let Some(url) = env_string("JOBSYNC_GITHUB_API_URL") {
            config.github.api_url = url;
        }
        if let Some(token) = env_string("JOBSYNC_GITHUB_TOKEN") {
            config.github.token = Some(Zeroizing::new(token));
        }
        if let Some(level) = env_string("JOBSYNC_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(json) = env_bool("JOBSYNC_LOG_JSON") {
            config.logging.json = json;
        }
        Ok(())
    }
}

fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents).map_err(|e| InfraError::from(e).into()),
        _ => Err(JobSyncError::Config(format!("unsupported config format: {extension}"))),
    }
}

/// Non-empty value of `key`, if set.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| JobSyncError::Config(format!("invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str) -> Option<bool> {
    env_string(key)
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
