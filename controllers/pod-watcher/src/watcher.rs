//! Pod watch loop.
//!
//! The loop lists pods to obtain a resourceVersion, watches from that
//! version, and starts over whenever the watch ends or is invalidated:
//!
//! ```text
//! Listing ──ok──▶ Watching ──stream ended / ERROR event──▶ Restarting ──▶ Listing
//!    │ err            │ open failed
//!    └─delay─▶ Listing└─delay─▶ Listing
//! ```
//!
//! Every state can move to `Terminated` when shutdown is requested; in
//! `--stop-on-delete` mode `Watching` also terminates once the target pod is
//! deleted. Restarts may re-deliver pods already written as fresh `ADDED`
//! events; they are written again.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use futures::StreamExt;
use pod_client::{ChangeNotification, NotificationStream, PodClientTrait, PodKey};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::WatcherConfig;
use crate::document::write_document;
use crate::error::ControllerError;
use crate::filter::MarkerFilter;
use crate::shutdown::sleep_or_cancel;
use crate::target_lock::{Decision, LockState, TargetLock};

/// Why the watch loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// Shutdown was requested
    Cancelled,
    /// The locked target pod was deleted
    TargetDeleted(PodKey),
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("shutdown requested"),
            Self::TargetDeleted(key) => write!(f, "target pod {key} deleted"),
        }
    }
}

#[derive(Debug)]
enum Phase {
    Listing,
    Watching(String),
    Restarting,
    Terminated(TerminationReason),
}

/// Drives list → watch → restart until shutdown or target deletion.
#[derive(Debug)]
pub struct WatchSupervisor<C, W> {
    client: C,
    filter: MarkerFilter,
    target: Option<TargetLock>,
    output: W,
    shutdown: CancellationToken,
    retry_delay: Duration,
    restart_delay: Duration,
    emitted: u64,
}

impl<C, W> WatchSupervisor<C, W>
where
    C: PodClientTrait,
    W: Write,
{
    /// Creates a supervisor writing matching pods to `output`.
    pub fn new(
        client: C,
        config: &WatcherConfig,
        output: W,
        shutdown: CancellationToken,
    ) -> Result<Self, ControllerError> {
        Ok(Self {
            client,
            filter: MarkerFilter::new(config.marker.clone())?,
            target: config.stop_on_delete.then(TargetLock::new),
            output,
            shutdown,
            retry_delay: config.retry_delay,
            restart_delay: config.restart_delay,
            emitted: 0,
        })
    }

    /// Number of documents written so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// The document sink
    #[cfg_attr(not(test), expect(dead_code, reason = "inspected by tests only"))]
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Target lock state; `None` unless `--stop-on-delete` is set
    pub fn target(&self) -> Option<&LockState> {
        self.target.as_ref().map(TargetLock::state)
    }

    /// Runs the loop to completion.
    ///
    /// Only a failure to write the document stream is returned as an error;
    /// list and watch failures are retried.
    pub async fn run(&mut self) -> Result<TerminationReason, ControllerError> {
        info!(
            "Watching pods in all namespaces (marker={:?}, stop_on_delete={})",
            self.filter.marker(),
            self.target.is_some()
        );

        let mut phase = Phase::Listing;
        loop {
            phase = match phase {
                Phase::Listing => self.list().await,
                Phase::Watching(resource_version) => self.watch(&resource_version).await?,
                Phase::Restarting => {
                    if let Some(LockState::Locked(key)) = self.target() {
                        debug!("Still tracking target pod {key}");
                    }
                    self.delay(self.restart_delay, Phase::Listing).await
                }
                Phase::Terminated(reason) => {
                    info!("Watcher stopped: {reason} ({} documents written)", self.emitted);
                    return Ok(reason);
                }
            };
        }
    }

    async fn delay(&self, delay: Duration, next: Phase) -> Phase {
        if sleep_or_cancel(&self.shutdown, delay).await {
            next
        } else {
            Phase::Terminated(TerminationReason::Cancelled)
        }
    }

    async fn list(&self) -> Phase {
        let listed = tokio::select! {
            biased;
            () = self.shutdown.cancelled() => return Phase::Terminated(TerminationReason::Cancelled),
            listed = self.client.list_pods() => listed,
        };

        match listed {
            Ok(snapshot) => {
                debug!(
                    "Listed {} pods at resourceVersion {}",
                    snapshot.pod_count, snapshot.resource_version
                );
                Phase::Watching(snapshot.resource_version)
            }
            Err(e) => {
                warn!("Pod list error: {e}. Retrying...");
                self.delay(self.retry_delay, Phase::Listing).await
            }
        }
    }

    async fn watch(&mut self, resource_version: &str) -> Result<Phase, ControllerError> {
        let opened = tokio::select! {
            biased;
            () = self.shutdown.cancelled() => return Ok(Phase::Terminated(TerminationReason::Cancelled)),
            opened = self.client.watch_pods(resource_version) => opened,
        };

        let mut stream = match opened {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Watch start failed (resourceVersion={resource_version}): {e}. Retrying...");
                return Ok(self.delay(self.retry_delay, Phase::Listing).await);
            }
        };

        let next = self.consume(&mut stream).await;
        drop(stream);
        debug!("Released pod watch at resourceVersion {resource_version}");
        next
    }

    async fn consume(&mut self, stream: &mut NotificationStream) -> Result<Phase, ControllerError> {
        loop {
            let item = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => {
                    info!("Shutdown requested, stopping watcher.");
                    return Ok(Phase::Terminated(TerminationReason::Cancelled));
                }
                item = stream.next() => item,
            };

            let notification = match item {
                Some(Ok(notification)) => notification,
                Some(Err(e)) if e.is_unexpected_payload() => {
                    warn!("Skipping watch event: {e}");
                    continue;
                }
                Some(Err(e)) => {
                    info!("Watch stream failed: {e}, restarting watch...");
                    return Ok(Phase::Restarting);
                }
                None => {
                    info!("Watch stream ended, restarting watch...");
                    return Ok(Phase::Restarting);
                }
            };

            if let Some(next) = self.handle(notification)? {
                return Ok(next);
            }
        }
    }

    /// Filters one notification and writes it if it passes.
    ///
    /// Returns the next phase when the notification ends the session.
    fn handle(&mut self, notification: ChangeNotification) -> Result<Option<Phase>, ControllerError> {
        let (kind, pod) = match notification.into_pod() {
            Ok(split) => split,
            Err(failure) => {
                info!("Watch error: {failure}, restarting watch...");
                return Ok(Some(Phase::Restarting));
            }
        };

        let key = PodKey::of(&pod);
        let yaml = match self.filter.matching_document(&pod) {
            Ok(Some(yaml)) => yaml,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Failed to marshal pod {key} to YAML: {e}");
                return Ok(None);
            }
        };

        let decision = self
            .target
            .as_mut()
            .map_or(Decision::Emit, |lock| lock.consider(&key, kind));
        debug!("{kind} {key}: {decision:?}");

        match decision {
            Decision::Suppress => Ok(None),
            Decision::Emit => {
                self.emit(&yaml)?;
                Ok(None)
            }
            Decision::EmitThenTerminate => {
                self.emit(&yaml)?;
                info!("Target pod {key} deleted, exiting watcher.");
                Ok(Some(Phase::Terminated(TerminationReason::TargetDeleted(key))))
            }
        }
    }

    fn emit(&mut self, yaml: &str) -> Result<(), ControllerError> {
        write_document(&mut self.output, yaml)?;
        self.emitted += 1;
        Ok(())
    }
}
