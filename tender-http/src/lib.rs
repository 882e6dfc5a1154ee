//! HTTP transport for tender payment gateways.
//!
//! Provides [`ReqwestTransport`], a [`tender::transport::Transport`] backed by a
//! pooled `reqwest` client, and the [`TransportConfig`] that tunes it.
//!
//! # Modules
//!
//! - [`constants`] - Default timeouts, pool size and user agent
//! - [`error`] - Client construction errors
//! - [`client`] - The reqwest transport

pub mod client;
pub mod constants;
pub mod error;

pub use client::{ReqwestTransport, TransportConfig};
pub use error::HttpClientError;
