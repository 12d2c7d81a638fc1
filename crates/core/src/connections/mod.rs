//! Remote connection registration

pub mod service;

pub use service::ConnectionService;
