//! Command-line runner for tender gateway operations.
//!
//! Loads a TOML configuration, builds one gateway client and runs a single
//! canonical operation, printing the canonical response as JSON.
//!
//! # Modules
//!
//! - [`commands`] - Argument parsing and dispatch
//! - [`config`] - Configuration file with environment variable expansion
//! - [`error`] - Runner error types
//! - [`util`] - Signal-driven cancellation

pub mod commands;
pub mod config;
pub mod error;
pub mod util;

pub use commands::{Cli, run, run_with_config, write_response};
pub use config::{CliConfig, GatewayKind};
pub use error::CliError;
