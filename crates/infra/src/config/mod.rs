//! Configuration loading
//!
//! Loads [`jobsync_domain::AppConfig`] from defaults, an optional file and
//! `JOBSYNC_*` environment variables.

pub mod loader;

pub use loader::{ConfigLoader, CONFIG_PATH_VAR};
