//! # jobsync Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - SQLite/SQLCipher repositories and the version ledger
//! - HTTP client, the Jenkins-style remote job client and the GitHub
//!   repository inspector
//! - Configuration loading and tracing setup
//! - [`AppContext`], which wires everything together
//!
//! ## Architecture
//! - Implements traits defined in `jobsync-core`
//! - Contains all "impure" code (I/O, network, filesystem)

pub mod config;
pub mod context;
pub mod database;
pub mod errors;
pub mod http;
pub mod observability;
pub mod remote;

// Re-export commonly used items
pub use config::ConfigLoader;
pub use context::AppContext;
pub use database::*;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
pub use remote::{GithubRepositoryInspector, JenkinsClient};
