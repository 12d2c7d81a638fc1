//! Domain types and models

pub mod connection;
pub mod history;
pub mod job;
pub mod script;
pub mod sync;

pub use connection::{NewRemoteConnection, RemoteConnection};
pub use history::{HistorySummary, JobHistory};
pub use job::{DeleteMode, JobDefinition, JobKind, JobSpec, JobUpdate, NewJob};
pub use script::{BuildLayout, BuildTool, ScriptRequest};
pub use sync::{HttpVerb, IntentBody, SagaState, SyncIntent, SyncOperation, SyncReceipt};
