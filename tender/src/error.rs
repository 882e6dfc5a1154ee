//! Error types for gateway calls.
//!
//! A gateway call either returns a canonical response (approved or declined)
//! or fails with a [`GatewayError`]. Declines are never errors; errors never
//! carry a canonical response.

use crate::codes::UnrecognizedToken;
use crate::request::Operation;

/// Failure to complete the HTTP round trip.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection to the gateway could not be established.
    #[error("connection to {url} failed: {message}")]
    Connect {
        /// Target URL.
        url: String,
        /// Underlying error text.
        message: String,
    },

    /// No response within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout {
        /// Target URL.
        url: String,
    },

    /// The caller cancelled the call before a response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// Any other failure while sending or reading the body.
    #[error("{context}: {source}")]
    Other {
        /// What the transport was doing when it failed.
        context: &'static str,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl TransportError {
    /// Wraps an arbitrary transport failure.
    pub fn other(
        context: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Other {
            context,
            source: source.into(),
        }
    }

    /// Whether this failure was caused by cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A canonical request could not be expressed in the gateway's wire format.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A field the gateway requires was missing from the request.
    #[error("{operation} request is missing required field `{field}`")]
    MissingField {
        /// Operation being encoded.
        operation: Operation,
        /// Canonical field name.
        field: &'static str,
    },

    /// The payload could not be serialized.
    #[error("failed to serialize {operation} payload: {message}")]
    Serialize {
        /// Operation being encoded.
        operation: Operation,
        /// Serializer error text.
        message: String,
    },

    /// The gateway URL could not be built.
    #[error("invalid gateway url: {0}")]
    Url(String),

    /// A header value contained characters HTTP does not allow.
    #[error("invalid value for header `{0}`")]
    InvalidHeader(&'static str),
}

/// Error returned from any gateway operation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Network failure, timeout or cancellation.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request could not be encoded for the gateway.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The reply did not match the gateway's expected wire shape.
    #[error("failed to decode {context}: {message}")]
    Decode {
        /// Which payload was being decoded.
        context: &'static str,
        /// Parser error text.
        message: String,
        /// HTTP status of the reply.
        status: u16,
    },

    /// The reply contained an enumerated token outside its closed table.
    #[error(transparent)]
    UnrecognizedToken(#[from] UnrecognizedToken),

    /// The protocol produced a response for a different operation.
    #[error("expected a {expected} response, got {actual}")]
    OperationMismatch {
        /// Operation that was requested.
        expected: Operation,
        /// Operation the response belongs to.
        actual: Operation,
    },
}

impl GatewayError {
    /// Builds a [`GatewayError::Decode`].
    pub fn decode(context: &'static str, status: u16, error: impl std::fmt::Display) -> Self {
        Self::Decode {
            context,
            message: error.to_string(),
            status,
        }
    }

    /// Whether the call failed because it was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Cancelled))
    }

    /// Whether the failure happened before a reply was received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
