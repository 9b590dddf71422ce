//! Shutdown signal handling.
//!
//! Operator interrupts are turned into a `CancellationToken` that every
//! blocking point of the watch loop races against.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::ControllerError;

/// Installed shutdown signal handlers.
#[derive(Debug)]
pub struct ShutdownSignals {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    /// Registers the handlers; must be called from within the runtime.
    #[cfg(unix)]
    pub fn install() -> Result<Self, ControllerError> {
        use tokio::signal::unix::{SignalKind, signal};

        let sigint = signal(SignalKind::interrupt())
            .map_err(|e| ControllerError::Signal(format!("SIGINT handler: {e}")))?;
        let sigterm = signal(SignalKind::terminate())
            .map_err(|e| ControllerError::Signal(format!("SIGTERM handler: {e}")))?;
        Ok(Self { sigint, sigterm })
    }

    /// Registers the handlers; Ctrl+C is hooked lazily on this platform.
    #[cfg(not(unix))]
    pub fn install() -> Result<Self, ControllerError> {
        Ok(Self {})
    }

    /// Waits for SIGINT, SIGTERM or Ctrl+C in the background, then cancels `token`.
    ///
    /// The task also returns once `token` is cancelled by someone else.
    pub fn spawn_listener(self, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            if self.wait(&token).await {
                token.cancel();
            }
        })
    }

    #[cfg(unix)]
    async fn wait(mut self, token: &CancellationToken) -> bool {
        tokio::select! {
            _ = self.sigint.recv() => info!("SIGINT detected."),
            _ = self.sigterm.recv() => info!("SIGTERM detected."),
            () = token.cancelled() => return false,
        }
        true
    }

    #[cfg(not(unix))]
    async fn wait(self, token: &CancellationToken) -> bool {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    tracing::warn!("Ctrl+C handler failed: {e}");
                    return false;
                }
                info!("Ctrl+C detected.");
            }
            () = token.cancelled() => return false,
        }
        true
    }
}

/// Sleeps for `delay` unless cancelled first.
///
/// Returns `false` if the token fired.
pub async fn sleep_or_cancel(token: &CancellationToken, delay: Duration) -> bool {
    tokio::select! {
        biased;
        () = token.cancelled() => {
            debug!("Delay interrupted by shutdown");
            false
        }
        () = tokio::time::sleep(delay) => true,
    }
}
