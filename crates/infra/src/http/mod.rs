//! HTTP transport for remote build servers

mod client;

pub(crate) use client::classify_transport_error;
pub use client::{HttpClient, HttpClientBuilder};
