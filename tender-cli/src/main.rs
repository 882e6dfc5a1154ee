//! `tender` command-line runner.
//!
//! # Usage
//!
//! ```bash
//! # Authorize 1.00 USD on a test card through the configured gateway
//! tender authorize --amount 100 --card-number 5111111111111118 --exp-month 1 --exp-year 2039
//!
//! # Void it through NMI with a custom config file
//! CONFIG=/etc/tender.toml tender --gateway nmi void --transaction-reference 7510231420
//!
//! # Show request-level logs
//! RUST_LOG=tender=debug tender capture --transaction-reference auth-1 --amount 100
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to TOML configuration file (default: `tender.toml`)
//! - `TENDER_GATEWAY` - Gateway to use (`mpgs` or `nmi`)
//! - `RUST_LOG` - Log level filter (default: `info`)
//!
//! A `.env` file in the working directory is loaded first.
//!
//! # Exit Status
//!
//! `0` approved, `2` declined, `1` the call could not be completed.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tender_cli::util::SigDown;
use tender_cli::{Cli, CliError, run, write_response};

const EXIT_DECLINED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let cli = Cli::parse();
    match execute(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_DECLINED),
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<bool, CliError> {
    let sig_down = SigDown::try_new().map_err(CliError::Signal)?;
    let response = run(cli, &sig_down.cancellation_token()).await?;
    write_response(std::io::stdout().lock(), &response)?;
    Ok(response.success())
}
