use jobsync_domain::{JobSyncError, LoggingConfig, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `config.level` is used as the filter
/// directive.
///
/// # Errors
///
/// Returns `JobSyncError::Config` for an invalid filter directive or when a
/// global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json().with_current_span(true).with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true).compact()).try_init()
    };

    installed.map_err(|e| JobSyncError::Config(format!("failed to install tracing subscriber: {e}")))
}

/// Filter from `RUST_LOG`, falling back to `fallback`.
///
/// # Errors
///
/// Returns `JobSyncError::Config` if `fallback` is not a valid directive.
pub fn build_filter(fallback: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(fallback)
            .map_err(|e| JobSyncError::Config(format!("invalid log level '{fallback}': {e}")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_fallback_is_config_error() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert!(matches!(build_filter("jobsync=verbose"), Err(JobSyncError::Config(_))));
    }

    #[test]
    fn second_init_fails_instead_of_panicking() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
