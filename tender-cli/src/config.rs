//! Runner configuration.
//!
//! Loaded from a TOML file. String values may reference the environment with
//! `$VAR` or `${VAR}`; references are expanded before parsing.
//!
//! # Example Configuration
//!
//! ```toml
//! gateway = "mpgs"
//!
//! [transport]
//! timeout_secs = 30
//!
//! [mpgs]
//! merchant_id = "$MPGS_MID"
//! password = "${MPGS_PASSWORD}"
//! host = "ap-gateway.mastercard.com"
//!
//! [nmi]
//! security_key = "$NMI_SECURITY_KEY"
//! environment = "sandbox"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tender_http::TransportConfig;
use tender_mpgs::MpgsConfig;
use tender_nmi::NmiConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "tender.toml";

/// Supported gateways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GatewayKind {
    /// Mastercard Payment Gateway Services.
    Mpgs,
    /// NMI Direct Post.
    Nmi,
}

impl fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mpgs => "mpgs",
            Self::Nmi => "nmi",
        })
    }
}

/// Top-level runner configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Gateway used when none is given on the command line.
    #[serde(default)]
    pub gateway: Option<GatewayKind>,
    /// HTTP client settings.
    #[serde(default)]
    pub transport: TransportSettings,
    /// MPGS merchant account.
    #[serde(default)]
    pub mpgs: Option<MpgsConfig>,
    /// NMI account.
    #[serde(default)]
    pub nmi: Option<NmiConfig>,
}

/// `[transport]` table. Unset values keep the client defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportSettings {
    /// Total time allowed per request, in seconds.
    pub timeout_secs: Option<u64>,
    /// Time allowed to connect, in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Idle connections kept per host.
    pub pool_max_idle_per_host: Option<usize>,
    /// `User-Agent` header value.
    pub user_agent: Option<String>,
}

impl TransportSettings {
    /// Applies the settings over [`TransportConfig::default`].
    #[must_use]
    pub fn to_config(&self) -> TransportConfig {
        let mut config = TransportConfig::default();
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.connect_timeout_secs {
            config = config.with_connect_timeout(Duration::from_secs(secs));
        }
        if let Some(max) = self.pool_max_idle_per_host {
            config = config.with_pool_max_idle_per_host(max);
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent);
        }
        config
    }
}

/// Failure to load the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// Configuration file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file is not valid configuration.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl CliConfig {
    /// Loads configuration from `path`, expanding environment references.
    ///
    /// A missing file yields the empty configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                String::new()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        Self::parse(&content, |name| std::env::var(name).ok())
    }

    /// Parses configuration text, resolving references through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the expanded text is not valid.
    pub fn parse(
        content: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        Ok(toml::from_str(&expand_env_vars(content, lookup))?)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replaces `$VAR` and `${VAR}` with values from `lookup`.
///
/// References that `lookup` cannot resolve are kept verbatim, as is a `$`
/// not followed by a name.
fn expand_env_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(at) = rest.find('$') {
        out.push_str(&rest[..at]);
        let after = &rest[at + 1..];

        let (name, reference_len) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after.find(|c| !is_name_char(c)).unwrap_or(after.len());
            (&after[..end], end)
        };

        let reference = &rest[at..=at + reference_len];
        match (name.is_empty(), lookup(name)) {
            (false, Some(value)) => out.push_str(&value),
            _ => out.push_str(reference),
        }
        rest = &rest[at + 1 + reference_len..];
    }

    out.push_str(rest);
    out
}
