//! Signal-driven cancellation.
//!
//! [`SigDown`] turns SIGINT or SIGTERM (Ctrl-C on Windows) into a cancelled
//! [`CancellationToken`]. The runner hands the token to the gateway call, so
//! an interrupted run aborts the in-flight request instead of leaving the
//! process waiting on the gateway.

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels a token when the process is asked to stop.
///
/// The listener task is aborted when the value is dropped.
#[derive(Debug)]
pub struct SigDown {
    cancellation_token: CancellationToken,
    listener: JoinHandle<()>,
}

impl SigDown {
    /// Installs the signal listeners. Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an [`std::io::Error`] if signal registration fails.
    #[cfg_attr(not(unix), allow(clippy::unnecessary_wraps))]
    pub fn try_new() -> Result<Self, std::io::Error> {
        let cancellation_token = CancellationToken::new();
        let trigger = cancellation_token.clone();

        #[cfg(unix)]
        let listener = {
            let mut sigterm = signal(SignalKind::terminate())?;
            let mut sigint = signal(SignalKind::interrupt())?;
            tokio::spawn(async move {
                tokio::select! {
                    _ = sigterm.recv() => tracing::warn!("received SIGTERM, cancelling"),
                    _ = sigint.recv() => tracing::warn!("received SIGINT, cancelling"),
                }
                trigger.cancel();
            })
        };

        #[cfg(not(unix))]
        let listener = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("received Ctrl-C, cancelling");
                trigger.cancel();
            }
        });

        Ok(Self {
            cancellation_token,
            listener,
        })
    }

    /// Returns a token that is cancelled on the first shutdown signal.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }
}

impl Drop for SigDown {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
