//! Synchronization of local jobs with the remote build server

pub mod coordinator;
pub mod errors;
pub mod intents;
pub mod ports;
pub mod saga;

pub use coordinator::SyncCoordinator;
pub use errors::{CompensationError, SagaError, SyncError, SyncErrorCategory};
pub use ports::RemoteJobClient;
pub use saga::Saga;
