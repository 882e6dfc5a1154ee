#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Canonical card payment operations over interchangeable gateways.
//!
//! Callers speak one vocabulary (authorize, capture, void, refund) and this
//! crate defines it. Each gateway crate (`tender-mpgs`, `tender-nmi`)
//! supplies a [`WireProtocol`](gateway::WireProtocol) that translates the
//! canonical model to and from its own wire format; [`GatewayClient`]
//! drives that protocol over an injected [`Transport`](transport::Transport).
//!
//! # Overview
//!
//! ```text
//! CanonicalRequest ─ensure_references─▶ WireProtocol::encode ─▶ Transport::send
//!                                                                   │
//! CanonicalResponse ◀──────────────── WireProtocol::decode ◀────────┘
//! ```
//!
//! A call ends in one of three ways:
//!
//! - `Ok(response)` with `response.success == true`
//! - `Ok(response)` with `response.success == false`: a business decline
//! - `Err(GatewayError)`: the call could not be completed
//!
//! # Modules
//!
//! - [`amount`] - Minor-unit amounts and currency exponents
//! - [`codes`] - Closed token tables for enumerated gateway fields
//! - [`error`] - Transport, encode and decode errors
//! - [`gateway`] - The [`PaymentGateway`] trait and the generic driver
//! - [`initiator`] - Stored-credential and recurring classification
//! - [`request`] - Canonical requests and reference back-fill
//! - [`response`] - Canonical responses
//! - [`transport`] - The HTTP transport seam
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod amount;
pub mod codes;
pub mod error;
pub mod gateway;
pub mod initiator;
pub mod request;
pub mod response;
pub mod transport;

pub use amount::Amount;
pub use error::{EncodeError, GatewayError, TransportError};
pub use gateway::{Environment, GatewayClient, PaymentGateway, WireProtocol};
pub use initiator::ProcessingInitiatorType;
pub use request::{
    AuthorizationRequest, BillingAddress, CanonicalRequest, CaptureRequest, CreditCard, Operation,
    References, RefundRequest, ThreeDs, VoidRequest,
};
pub use response::{
    AuthorizationResponse, CanonicalResponse, CaptureResponse, Outcome, RefundResponse,
    TransportMetadata, VoidResponse,
};
pub use tokio_util::sync::CancellationToken;
