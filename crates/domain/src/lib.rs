//! # jobsync Domain
//!
//! Business domain types for CI job synchronization.
//!
//! This crate contains:
//! - Job, history, connection and saga types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Controlled-tag and template constants
//!
//! ## Architecture
//! - No dependencies on other jobsync crates
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::build_layout::detect_build_layout;
pub use utils::stage_extractor::extract_stage_names;
