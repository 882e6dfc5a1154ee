//! Transport defaults.

use std::time::Duration;

/// Total time allowed for one request, including reading the body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Time allowed to establish a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Idle connections kept per gateway host.
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 8;

/// `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("tender/", env!("CARGO_PKG_VERSION"));
