//! A [`Transport`] implementation over a pooled `reqwest` client.
//!
//! One [`ReqwestTransport`] is meant to be built once and shared by every
//! gateway client in the process; reqwest keeps the connection pool.
//!
//! Cancellation races the whole round trip (send and body read) against the
//! caller's [`CancellationToken`]. Dropping the losing future aborts the
//! in-flight request.

use std::time::Duration;

use http::HeaderValue;
use reqwest::Client;
use tender::transport::{OutboundRequest, RawResponse, Transport};
use tender::TransportError;
use tokio_util::sync::CancellationToken;

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_POOL_MAX_IDLE_PER_HOST, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
use crate::error::{HttpClientError, classify};

/// Connection and timeout policy for [`ReqwestTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Total time allowed per request.
    pub timeout: Duration,
    /// Time allowed to establish a connection.
    pub connect_timeout: Duration,
    /// Idle connections kept per host.
    pub pool_max_idle_per_host: usize,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl TransportConfig {
    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets how many idle connections are kept per host.
    #[must_use]
    pub const fn with_pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Sends gateway requests with `reqwest`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport with the given policy.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError`] if the user agent is invalid or the TLS
    /// backend cannot be initialized.
    pub fn new(config: &TransportConfig) -> Result<Self, HttpClientError> {
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| HttpClientError::UserAgent(config.user_agent.clone()))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(user_agent)
            .build()
            .map_err(|source| HttpClientError::Build {
                context: "applying transport config",
                source,
            })?;
        Ok(Self { client })
    }

    /// Wraps an already configured reqwest client.
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn round_trip(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        let OutboundRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let response = self
            .client
            .request(method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| classify(&url, e))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| classify(&url, e))?;

        #[cfg(feature = "telemetry")]
        tracing::Span::current().record("http.status_code", status);

        Ok(RawResponse::new(status, headers, body.to_vec()))
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    #[cfg_attr(feature = "telemetry", tracing::instrument(
        name = "tender.http.send",
        skip_all,
        err,
        fields(http.method = %request.method, http.status_code)
    ))]
    async fn send(
        &self,
        request: OutboundRequest,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, TransportError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.round_trip(request) => result,
        }
    }
}
