//! Command-line configuration.
//!
//! Every flag can also be set through the environment, so the watcher can be
//! configured the same way when it runs as a pod.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::ControllerError;

/// Watch Kubernetes pods and stream changes to those containing a marker string.
///
/// All pods across all namespaces are observed. Every change to a pod whose
/// YAML contains the marker is written to stdout as a separate YAML document.
///
/// Examples:
///   pod-watcher --marker "DEBUG_MODE"
///   pod-watcher --marker "DEBUG_MODE" --stop-on-delete
#[derive(Debug, Parser)]
#[command(name = "pod-watcher", version, verbatim_doc_comment)]
pub struct Cli {
    /// Marker substring to filter pods (required)
    #[arg(short, long, env = "POD_WATCHER_MARKER")]
    pub marker: String,

    /// Stop after the first matching pod is deleted
    #[arg(short, long, env = "POD_WATCHER_STOP_ON_DELETE")]
    pub stop_on_delete: bool,

    /// Path to kubeconfig file (defaults to the standard locations, then in-cluster config)
    #[arg(long, value_name = "PATH", env = "POD_WATCHER_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Seconds to wait before retrying a failed list or watch
    #[arg(long, value_name = "SECS", default_value_t = 2, env = "POD_WATCHER_RETRY_DELAY_SECS")]
    pub retry_delay_secs: u64,

    /// Seconds to wait before re-listing after a watch ends
    #[arg(long, value_name = "SECS", default_value_t = 1, env = "POD_WATCHER_RESTART_DELAY_SECS")]
    pub restart_delay_secs: u64,
}

/// Validated watch loop settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Substring a pod's YAML must contain to be emitted
    pub marker: String,
    /// Lock onto the first matching pod and stop once it is deleted
    pub stop_on_delete: bool,
    /// Delay after a failed list or watch open
    pub retry_delay: Duration,
    /// Delay between a finished watch and the next listing
    pub restart_delay: Duration,
}

impl Cli {
    /// Splits the arguments into the watch loop settings and the kubeconfig path.
    pub fn into_config(self) -> Result<(WatcherConfig, Option<PathBuf>), ControllerError> {
        if self.marker.is_empty() {
            return Err(ControllerError::InvalidConfig(
                "--marker must not be empty".to_string(),
            ));
        }

        let config = WatcherConfig {
            marker: self.marker,
            stop_on_delete: self.stop_on_delete,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            restart_delay: Duration::from_secs(self.restart_delay_secs),
        };
        Ok((config, self.kubeconfig))
    }
}
