//! Canonical responses for the four gateway operations.
//!
//! A response with `success == false` is a business decline: the gateway
//! understood the request and rejected it. Transport and decode failures never
//! produce a response; they surface as [`GatewayError`](crate::error::GatewayError).

use std::collections::BTreeMap;

use http::HeaderMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::request::{CanonicalRequest, Operation, References};

/// HTTP-level details of the gateway reply, passed through for diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransportMetadata {
    /// HTTP status code of the gateway reply.
    pub status_code: u16,
    /// Gateway reply headers.
    #[serde(serialize_with = "serialize_headers")]
    pub headers: HeaderMap,
}

impl TransportMetadata {
    /// Creates metadata from a status code and headers.
    #[must_use]
    pub const fn new(status_code: u16, headers: HeaderMap) -> Self {
        Self {
            status_code,
            headers,
        }
    }
}

fn serialize_headers<S: Serializer>(headers: &HeaderMap, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(headers.len()))?;
    for (name, value) in headers {
        map.serialize_entry(name.as_str(), &String::from_utf8_lossy(value.as_bytes()))?;
    }
    map.end()
}

/// Result of an authorization.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthorizationResponse {
    /// Whether the gateway approved the authorization.
    pub success: bool,
    /// Gateway id of the new transaction; empty on decline.
    pub transaction_reference: String,
    /// Gateway id as reported externally (receipts, dashboards).
    pub external_transaction_id: String,
    /// Gateway result or status token.
    pub response: String,
    /// Gateway cause for a decline.
    pub error_code: Option<String>,
    /// Address verification result, verbatim from the gateway.
    pub avs_result_raw: Option<String>,
    /// Card security code result, verbatim from the gateway.
    pub cvv_result_raw: Option<String>,
    /// Additional gateway-specific values (receipt number, auth code, ...).
    pub metadata: BTreeMap<String, String>,
    /// Merchant order reference that was sent.
    pub merchant_order_reference: String,
    /// Client transaction reference that was sent.
    pub client_transaction_reference: String,
    /// HTTP details of the reply.
    #[serde(flatten)]
    pub transport: TransportMetadata,
}

/// Result of a capture.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CaptureResponse {
    /// Whether the capture succeeded.
    pub success: bool,
    /// Gateway id of the capture, or of the original transaction on decline.
    pub transaction_reference: String,
    /// Gateway result or status token.
    pub response: String,
    /// Gateway cause for a decline.
    pub error_code: Option<String>,
    /// Merchant order reference that was sent.
    pub merchant_order_reference: String,
    /// Client transaction reference that was sent.
    pub client_transaction_reference: String,
    /// HTTP details of the reply.
    #[serde(flatten)]
    pub transport: TransportMetadata,
}

/// Result of a void.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VoidResponse {
    /// Whether the void succeeded.
    pub success: bool,
    /// Gateway id of the void, or of the original transaction on decline.
    pub transaction_reference: String,
    /// Gateway result or status token.
    pub response: String,
    /// Gateway cause for a decline.
    pub error_code: Option<String>,
    /// Merchant order reference that was sent.
    pub merchant_order_reference: String,
    /// Client transaction reference that was sent.
    pub client_transaction_reference: String,
    /// HTTP details of the reply.
    #[serde(flatten)]
    pub transport: TransportMetadata,
}

/// Result of a refund.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefundResponse {
    /// Whether the refund succeeded.
    pub success: bool,
    /// Gateway id of the refund, or of the original transaction on decline.
    pub transaction_reference: String,
    /// Gateway result or status token.
    pub response: String,
    /// Gateway cause for a decline.
    pub error_code: Option<String>,
    /// Merchant order reference that was sent.
    pub merchant_order_reference: String,
    /// Client transaction reference that was sent.
    pub client_transaction_reference: String,
    /// HTTP details of the reply.
    #[serde(flatten)]
    pub transport: TransportMetadata,
}

/// A canonical response tagged with its operation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum CanonicalResponse {
    /// See [`AuthorizationResponse`].
    Authorize(AuthorizationResponse),
    /// See [`CaptureResponse`].
    Capture(CaptureResponse),
    /// See [`VoidResponse`].
    Void(VoidResponse),
    /// See [`RefundResponse`].
    Refund(RefundResponse),
}

impl CanonicalResponse {
    /// Returns which operation produced this response.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Authorize(_) => Operation::Authorize,
            Self::Capture(_) => Operation::Capture,
            Self::Void(_) => Operation::Void,
            Self::Refund(_) => Operation::Refund,
        }
    }

    /// Whether the gateway accepted the operation.
    #[must_use]
    pub const fn success(&self) -> bool {
        match self {
            Self::Authorize(r) => r.success,
            Self::Capture(r) => r.success,
            Self::Void(r) => r.success,
            Self::Refund(r) => r.success,
        }
    }

    /// Gateway cause for a decline, if any.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Authorize(r) => r.error_code.as_deref(),
            Self::Capture(r) => r.error_code.as_deref(),
            Self::Void(r) => r.error_code.as_deref(),
            Self::Refund(r) => r.error_code.as_deref(),
        }
    }
}

/// Gateway-neutral classification of one reply, before it is shaped into
/// the response type of the operation that was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Whether the gateway accepted the operation.
    pub success: bool,
    /// Id of the transaction the gateway created, if it created one.
    pub transaction_id: Option<String>,
    /// Gateway result or status token.
    pub response: String,
    /// Gateway cause for a decline.
    pub error_code: Option<String>,
    /// Raw address verification result.
    pub avs_result_raw: Option<String>,
    /// Raw card security code result.
    pub cvv_result_raw: Option<String>,
    /// Additional gateway-specific values. Only authorizations carry them.
    pub metadata: BTreeMap<String, String>,
}

impl Outcome {
    /// Inserts `value` under `key` unless it is absent or empty.
    pub fn insert_metadata(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.metadata.insert(key.to_owned(), value.to_owned());
        }
    }

    /// Builds the response for `request`.
    ///
    /// The transaction reference is the created transaction's id. Without
    /// one, a capture, void or refund keeps the reference it was sent with
    /// and an authorization reports an empty one.
    #[must_use]
    pub fn into_response(
        self,
        request: &CanonicalRequest,
        transport: TransportMetadata,
    ) -> CanonicalResponse {
        let merchant_order_reference = request
            .merchant_order_reference()
            .unwrap_or_default()
            .to_owned();
        let client_transaction_reference = request
            .client_transaction_reference()
            .unwrap_or_default()
            .to_owned();
        let transaction_reference = match (self.transaction_id, request.transaction_reference()) {
            (Some(id), _) => id,
            (None, Some(original)) => original.to_owned(),
            (None, None) => String::new(),
        };

        match request {
            CanonicalRequest::Authorize(_) => CanonicalResponse::Authorize(AuthorizationResponse {
                success: self.success,
                external_transaction_id: transaction_reference.clone(),
                transaction_reference,
                response: self.response,
                error_code: self.error_code,
                avs_result_raw: self.avs_result_raw,
                cvv_result_raw: self.cvv_result_raw,
                metadata: self.metadata,
                merchant_order_reference,
                client_transaction_reference,
                transport,
            }),
            CanonicalRequest::Capture(_) => CanonicalResponse::Capture(CaptureResponse {
                success: self.success,
                transaction_reference,
                response: self.response,
                error_code: self.error_code,
                merchant_order_reference,
                client_transaction_reference,
                transport,
            }),
            CanonicalRequest::Void(_) => CanonicalResponse::Void(VoidResponse {
                success: self.success,
                transaction_reference,
                response: self.response,
                error_code: self.error_code,
                merchant_order_reference,
                client_transaction_reference,
                transport,
            }),
            CanonicalRequest::Refund(_) => CanonicalResponse::Refund(RefundResponse {
                success: self.success,
                transaction_reference,
                response: self.response,
                error_code: self.error_code,
                merchant_order_reference,
                client_transaction_reference,
                transport,
            }),
        }
    }
}
