//! Error types for the HTTP transport.

use tender::TransportError;

/// Errors raised while building the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    /// The reqwest client could not be constructed.
    #[error("failed to build HTTP client: {context}: {source}")]
    Build {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The configured user agent is not a valid header value.
    #[error("invalid user agent {0:?}")]
    UserAgent(String),
}

/// Maps a reqwest failure onto the transport error taxonomy.
pub(crate) fn classify(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_owned(),
        }
    } else if err.is_connect() {
        TransportError::Connect {
            url: url.to_owned(),
            message: err.to_string(),
        }
    } else if err.is_body() || err.is_decode() {
        TransportError::other("reading response body", err)
    } else {
        TransportError::other("sending request", err)
    }
}
