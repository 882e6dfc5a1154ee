//! Error types for the runner.

use tender::GatewayError;
use tender_http::HttpClientError;

use crate::config::{ConfigError, GatewayKind};

/// Anything that stops the runner from producing a response.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Neither `--gateway` nor the configuration picked a gateway.
    #[error("no gateway selected: pass --gateway or set `gateway` in the configuration file")]
    NoGateway,

    /// The selected gateway has no account section.
    #[error("gateway {0} is not configured: add a [{0}] table to the configuration file")]
    NotConfigured(GatewayKind),

    /// The HTTP client could not be built.
    #[error(transparent)]
    Transport(#[from] HttpClientError),

    /// The gateway call failed.
    #[error("gateway call failed: {0}")]
    Gateway(#[from] GatewayError),

    /// Signal handlers could not be installed.
    #[error("cannot install signal handlers: {0}")]
    Signal(#[source] std::io::Error),

    /// The response could not be written.
    #[error("cannot write response: {0}")]
    Output(#[from] serde_json::Error),
}
