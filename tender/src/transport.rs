//! The HTTP transport seam.
//!
//! Gateway protocols produce an [`OutboundRequest`] and consume a
//! [`RawResponse`]; everything in between (connection pooling, TLS, timeouts)
//! belongs to a [`Transport`] implementation such as `tender-http`'s reqwest
//! client.

use std::fmt;

use http::{HeaderMap, Method};
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;

/// A fully formed HTTP request ready to be sent.
#[derive(Clone)]
pub struct OutboundRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Request headers, including authentication and content type.
    pub headers: HeaderMap,
    /// Encoded body.
    pub body: Vec<u8>,
}

impl OutboundRequest {
    /// Creates a request with no headers and an empty body.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Replaces the header map.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

// Headers carry credentials and bodies carry card data.
impl fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// The raw reply from the gateway.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub const fn new(status: u16, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Body as UTF-8, with invalid sequences replaced.
    #[must_use]
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Sends one request and returns the gateway's reply.
///
/// Implementations must be safe for concurrent use and must stop waiting as
/// soon as `cancel` fires, returning [`TransportError::Cancelled`]. Any HTTP
/// status is a successful round trip; classifying it is the protocol's job.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request`, honoring `cancel`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no reply could be obtained.
    async fn send(
        &self,
        request: OutboundRequest,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::AUTHORIZATION;
    use http::HeaderValue;

    #[test]
    fn test_debug_hides_header_values_and_body() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic c2VjcmV0"));
        let request = OutboundRequest::new(Method::PUT, "https://gw.test/x")
            .with_headers(headers)
            .with_body(b"ccnumber=4111111111111111".to_vec());

        let rendered = format!("{request:?}");
        assert!(rendered.contains("authorization"));
        assert!(!rendered.contains("c2VjcmV0"));
        assert!(!rendered.contains("4111111111111111"));
        assert!(rendered.contains("body_len: 25"));
    }

    #[test]
    fn test_body_text_is_lossy() {
        let response = RawResponse::new(200, HeaderMap::new(), vec![b'o', b'k', 0xff]);
        assert_eq!(response.body_text(), "ok\u{fffd}");
    }
}
