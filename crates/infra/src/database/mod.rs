//! Database implementations

mod connection_repository;
mod history_repository;
mod job_repository;
pub mod manager;
pub mod pool;
mod rows;
pub mod version_ledger;

pub use connection_repository::SqliteConnectionRepository;
pub use history_repository::SqliteHistoryRepository;
pub use job_repository::SqliteJobRepository;
pub use manager::DbManager;
pub use pool::{create_pool, PooledConn, SqlitePool};
