//! Declarative pipeline script generation

pub mod ports;
pub mod service;

pub use ports::{GithubRepository, RepositoryInspector};
pub use service::{script_context, GeneratedScript, PipelineScriptService, ScriptError};
