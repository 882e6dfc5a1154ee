//! Mastercard Payment Gateway Services (MPGS) adapter.
//!
//! Speaks the MPGS REST API (JSON over `PUT` with HTTP basic auth) and exposes
//! it through [`tender::PaymentGateway`].
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//!
//! use tender::{Amount, AuthorizationRequest, CreditCard, PaymentGateway};
//! use tender_http::{ReqwestTransport, TransportConfig};
//! use tender_mpgs::{Mpgs, MpgsConfig};
//!
//! let transport = Arc::new(ReqwestTransport::new(&TransportConfig::default())?);
//! let client = Mpgs::client(
//!     MpgsConfig::new("TESTMERCHANT", "api-password", "ap-gateway.mastercard.com"),
//!     transport,
//! );
//! let request = AuthorizationRequest::new(Amount::new(100, "USD")).with_credit_card(CreditCard {
//!     first_name: "John".into(),
//!     last_name: "Doe".into(),
//!     number: "5111111111111118".into(),
//!     expiration_month: 1,
//!     expiration_year: 2039,
//!     cvv: "100".into(),
//!     save: false,
//! });
//! let response = client.authorize(&request).await?;
//! println!("approved: {}", response.success);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`codes`] - Closed token tables and the processing-initiator mapping
//! - [`request`] - JSON request bodies
//! - [`response`] - JSON reply bodies
//! - [`protocol`] - Configuration and the [`tender::WireProtocol`] impl
//!
//! # Feature Flags
//!
//! - `telemetry` - Logs declines and undecodable replies through `tracing`

pub mod codes;
pub mod protocol;
pub mod request;
pub mod response;

pub use protocol::{DEFAULT_API_VERSION, Mpgs, MpgsClient, MpgsConfig};
