//! NMI Direct Post adapter.
//!
//! Sends url-encoded forms to NMI's `transact.php` and exposes them through
//! [`tender::PaymentGateway`]. Sandbox accounts are selected with
//! [`tender::Environment::Sandbox`], which adds `test_mode=enabled`.
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//!
//! use tender::{Amount, Environment, PaymentGateway, VoidRequest};
//! use tender_http::{ReqwestTransport, TransportConfig};
//! use tender_nmi::{Nmi, NmiConfig};
//!
//! let transport = Arc::new(ReqwestTransport::new(&TransportConfig::default())?);
//! let config = NmiConfig::new("security-key").with_environment(Environment::Sandbox);
//! let client = Nmi::client(config, transport);
//!
//! let response = client.void(&VoidRequest::new("7510231420")).await?;
//! if !response.success {
//!     println!("void declined: {:?}", response.error_code);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`codes`] - Closed token tables and the stored-credential mapping
//! - [`request`] - The request form
//! - [`response`] - The reply form
//! - [`protocol`] - Configuration and the [`tender::WireProtocol`] impl
//!
//! # Feature Flags
//!
//! - `telemetry` - Logs declines and undecodable replies through `tracing`

pub mod codes;
pub mod protocol;
pub mod request;
pub mod response;

pub use protocol::{DEFAULT_ENDPOINT, Nmi, NmiClient, NmiConfig};
