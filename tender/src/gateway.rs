//! The canonical gateway interface and the generic driver behind it.
//!
//! [`PaymentGateway`] is what callers use. [`GatewayClient`] implements it for
//! any [`WireProtocol`], running the same pipeline for every operation:
//! fill in missing references, encode, send once, decode.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::GatewayError;
use crate::request::{
    AuthorizationRequest, CanonicalRequest, CaptureRequest, Operation, References, RefundRequest,
    VoidRequest,
};
use crate::response::{
    AuthorizationResponse, CanonicalResponse, CaptureResponse, RefundResponse, VoidResponse,
};
use crate::transport::{OutboundRequest, RawResponse, Transport};

/// Gateway account environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Live account; real money moves.
    #[default]
    Production,
    /// Test account or test mode.
    Sandbox,
}

impl Environment {
    /// Whether this is a test environment.
    #[must_use]
    pub const fn is_sandbox(self) -> bool {
        matches!(self, Self::Sandbox)
    }
}

/// The four canonical operations against one configured gateway.
///
/// Each call performs exactly one round trip. `Ok` with `success == false` is
/// a decline; `Err` means the call could not be completed.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Reserves funds, aborting if `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, encode or decode failure.
    async fn authorize_with_cancellation(
        &self,
        request: &AuthorizationRequest,
        cancel: &CancellationToken,
    ) -> Result<AuthorizationResponse, GatewayError>;

    /// Settles a prior authorization, aborting if `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, encode or decode failure.
    async fn capture_with_cancellation(
        &self,
        request: &CaptureRequest,
        cancel: &CancellationToken,
    ) -> Result<CaptureResponse, GatewayError>;

    /// Cancels a prior transaction, aborting if `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, encode or decode failure.
    async fn void_with_cancellation(
        &self,
        request: &VoidRequest,
        cancel: &CancellationToken,
    ) -> Result<VoidResponse, GatewayError>;

    /// Returns captured funds, aborting if `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, encode or decode failure.
    async fn refund_with_cancellation(
        &self,
        request: &RefundRequest,
        cancel: &CancellationToken,
    ) -> Result<RefundResponse, GatewayError>;

    /// Reserves funds.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, encode or decode failure.
    async fn authorize(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationResponse, GatewayError> {
        self.authorize_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Settles a prior authorization.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, encode or decode failure.
    async fn capture(&self, request: &CaptureRequest) -> Result<CaptureResponse, GatewayError> {
        self.capture_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Cancels a prior transaction.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, encode or decode failure.
    async fn void(&self, request: &VoidRequest) -> Result<VoidResponse, GatewayError> {
        self.void_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Returns captured funds.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, encode or decode failure.
    async fn refund(&self, request: &RefundRequest) -> Result<RefundResponse, GatewayError> {
        self.refund_with_cancellation(request, &CancellationToken::new())
            .await
    }
}

/// One gateway's wire format.
///
/// Both directions are pure. `encode` receives a request whose references
/// have already been filled in; `decode` receives the same request so it can
/// echo references and fall back to the caller's transaction id on decline.
pub trait WireProtocol: Send + Sync {
    /// Short gateway name used in spans and logs.
    fn name(&self) -> &'static str;

    /// Builds the HTTP request for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Encode`] if the request cannot be expressed.
    fn encode(&self, request: &CanonicalRequest) -> Result<OutboundRequest, GatewayError>;

    /// Classifies and translates the gateway's reply.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Decode`] or [`GatewayError::UnrecognizedToken`]
    /// when the reply is not in the expected shape.
    fn decode(
        &self,
        request: &CanonicalRequest,
        response: RawResponse,
    ) -> Result<CanonicalResponse, GatewayError>;
}

/// A [`PaymentGateway`] driving a [`WireProtocol`] over a [`Transport`].
///
/// Read-only after construction; clone it or wrap it in an `Arc` to share
/// across tasks.
pub struct GatewayClient<P> {
    protocol: Arc<P>,
    transport: Arc<dyn Transport>,
}

impl<P> Clone for GatewayClient<P> {
    fn clone(&self) -> Self {
        Self {
            protocol: Arc::clone(&self.protocol),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<P: WireProtocol> fmt::Debug for GatewayClient<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("gateway", &self.protocol.name())
            .finish_non_exhaustive()
    }
}

impl<P: WireProtocol> GatewayClient<P> {
    /// Creates a client for `protocol` sending through `transport`.
    pub fn new(protocol: P, transport: Arc<dyn Transport>) -> Self {
        Self {
            protocol: Arc::new(protocol),
            transport,
        }
    }

    /// Returns the wire protocol.
    #[must_use]
    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    /// Runs one canonical operation end to end.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request cannot be encoded, the round
    /// trip fails or is cancelled, or the reply cannot be decoded.
    #[cfg_attr(feature = "telemetry", tracing::instrument(
        name = "tender.gateway.execute",
        skip_all,
        err,
        fields(gateway = self.protocol.name(), operation = %request.operation(), success)
    ))]
    pub async fn execute(
        &self,
        request: CanonicalRequest,
        cancel: &CancellationToken,
    ) -> Result<CanonicalResponse, GatewayError> {
        let request = request.ensure_references();
        let outbound = self.protocol.encode(&request)?;
        let raw = self.transport.send(outbound, cancel).await?;
        let response = self.protocol.decode(&request, raw)?;

        let expected = request.operation();
        let actual = response.operation();
        if expected != actual {
            return Err(GatewayError::OperationMismatch { expected, actual });
        }

        #[cfg(feature = "telemetry")]
        {
            tracing::Span::current().record("success", response.success());
            if !response.success() {
                tracing::info!(
                    error_code = response.error_code().unwrap_or_default(),
                    "gateway declined the operation"
                );
            }
        }

        Ok(response)
    }
}

fn mismatch(expected: Operation, response: &CanonicalResponse) -> GatewayError {
    GatewayError::OperationMismatch {
        expected,
        actual: response.operation(),
    }
}

#[async_trait::async_trait]
impl<P: WireProtocol> PaymentGateway for GatewayClient<P> {
    async fn authorize_with_cancellation(
        &self,
        request: &AuthorizationRequest,
        cancel: &CancellationToken,
    ) -> Result<AuthorizationResponse, GatewayError> {
        match self
            .execute(CanonicalRequest::Authorize(request.clone()), cancel)
            .await?
        {
            CanonicalResponse::Authorize(response) => Ok(response),
            other => Err(mismatch(Operation::Authorize, &other)),
        }
    }

    async fn capture_with_cancellation(
        &self,
        request: &CaptureRequest,
        cancel: &CancellationToken,
    ) -> Result<CaptureResponse, GatewayError> {
        match self
            .execute(CanonicalRequest::Capture(request.clone()), cancel)
            .await?
        {
            CanonicalResponse::Capture(response) => Ok(response),
            other => Err(mismatch(Operation::Capture, &other)),
        }
    }

    async fn void_with_cancellation(
        &self,
        request: &VoidRequest,
        cancel: &CancellationToken,
    ) -> Result<VoidResponse, GatewayError> {
        match self
            .execute(CanonicalRequest::Void(request.clone()), cancel)
            .await?
        {
            CanonicalResponse::Void(response) => Ok(response),
            other => Err(mismatch(Operation::Void, &other)),
        }
    }

    async fn refund_with_cancellation(
        &self,
        request: &RefundRequest,
        cancel: &CancellationToken,
    ) -> Result<RefundResponse, GatewayError> {
        match self
            .execute(CanonicalRequest::Refund(request.clone()), cancel)
            .await?
        {
            CanonicalResponse::Refund(response) => Ok(response),
            other => Err(mismatch(Operation::Refund, &other)),
        }
    }
}
