//! Configuration management

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DB_PATH, DEFAULT_GITHUB_API_URL, DEFAULT_POOL_SIZE,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub encryption: EncryptionConfig,
    pub templates: TemplateConfig,
    pub github: GithubConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
    /// SQLCipher passphrase; plain SQLite when absent.
    #[serde(skip_serializing)]
    pub encryption_key: Option<Zeroizing<String>>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_POOL_SIZE, encryption_key: None }
    }
}

/// Remote build server client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Secret cipher configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    /// Base64-encoded 32-byte key for stored credentials.
    #[serde(skip_serializing)]
    pub key: Option<Zeroizing<String>>,
}

/// Template lookup configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory of `*.mustache` files overriding the built-in templates.
    pub dir: Option<String>,
}

/// GitHub API access used when generating pipeline scripts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    /// Personal access token; anonymous requests when absent.
    #[serde(skip_serializing)]
    pub token: Option<Zeroizing<String>>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_GITHUB_API_URL.to_string(), token: None }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter directive when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
