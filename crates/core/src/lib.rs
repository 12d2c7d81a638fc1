//! # jobsync Core
//!
//! Business logic for keeping CI job definitions in sync with a remote
//! build server. No database or HTTP code lives here.
//!
//! This crate contains:
//! - Template rendering of job configurations
//! - Controlled-section XML merging
//! - Version ledger rules
//! - The synchronization saga and its ports
//! - Pipeline script generation from a detected build tool
//!
//! ## Architecture Principles
//! - Depends only on `jobsync-common` and `jobsync-domain`
//! - All storage and remote access goes through traits
//! - Services are stateless and injected with `Arc<dyn Port>`

pub mod connections;
pub mod jobs;
pub mod ledger;
pub mod merge;
pub mod scripts;
pub mod sync;
pub mod template;

pub use connections::ConnectionService;
pub use jobs::ports::{ConnectionRepository, JobHistoryRepository, JobRepository};
pub use jobs::JobService;
pub use merge::{MergeError, XmlPatchMerger};
pub use scripts::{
    GeneratedScript, GithubRepository, PipelineScriptService, RepositoryInspector, ScriptError,
};
pub use sync::{
    CompensationError, RemoteJobClient, SagaError, SyncCoordinator, SyncError, SyncErrorCategory,
};
pub use template::{ConfigTemplateEngine, TemplateError};
