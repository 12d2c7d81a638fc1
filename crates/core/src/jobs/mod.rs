//! Job queries and storage ports

pub mod ports;
pub mod service;

pub use ports::{ConnectionRepository, JobHistoryRepository, JobRepository};
pub use service::JobService;
