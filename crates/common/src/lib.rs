//! Shared primitives for the jobsync crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error types only
//! - `runtime`: cryptographic primitives ([`crypto::SecretCipher`])

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod crypto;

#[cfg(feature = "runtime")]
pub use crypto::{CryptoError, SecretCipher};
