//! Main controller implementation.
//!
//! This module contains the `Controller` struct that loads cluster
//! credentials, wires shutdown signals and runs the pod watch loop against
//! stdout.

use std::io::{self, Stdout};
use std::path::Path;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use pod_client::PodClient;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cli::WatcherConfig;
use crate::error::ControllerError;
use crate::shutdown::ShutdownSignals;
use crate::watcher::WatchSupervisor;

/// Main controller for the pod watcher.
#[derive(Debug)]
pub struct Controller {
    supervisor: WatchSupervisor<PodClient, Stdout>,
    signals: ShutdownSignals,
    shutdown: CancellationToken,
}

/// Builds the client configuration.
///
/// An explicit kubeconfig wins; otherwise the default kubeconfig locations
/// are tried, then the in-cluster service account.
async fn load_kube_config(kubeconfig: Option<&Path>) -> Result<Config, ControllerError> {
    match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)?;
            Ok(Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?)
        }
        None => Ok(Config::infer().await?),
    }
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(config: WatcherConfig, kubeconfig: Option<&Path>) -> Result<Self, ControllerError> {
        info!("Initializing pod watcher");

        let kube_config = load_kube_config(kubeconfig).await.inspect_err(|e| {
            error!("Failed to load Kubernetes credentials: {}", e);
            error!("Please ensure:");
            error!("  1. --kubeconfig points to a readable kubeconfig, or");
            error!("  2. a default kubeconfig exists (~/.kube/config or KUBECONFIG), or");
            error!("  3. the watcher runs in a pod with a service account");
        })?;
        info!("Connecting to cluster at {}", kube_config.cluster_url);
        let kube_client = Client::try_from(kube_config)?;

        let signals = ShutdownSignals::install()?;
        let shutdown = CancellationToken::new();
        let supervisor = WatchSupervisor::new(
            PodClient::new(kube_client),
            &config,
            io::stdout(),
            shutdown.clone(),
        )?;

        Ok(Self {
            supervisor,
            signals,
            shutdown,
        })
    }

    /// Runs the watcher until shutdown or, with `--stop-on-delete`, until the target is deleted.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        let listener = self.signals.spawn_listener(self.shutdown.clone());

        let result = self.supervisor.run().await;

        // Release the signal listener on every exit path
        self.shutdown.cancel();
        if let Err(e) = listener.await {
            error!("Signal listener panicked: {}", e);
        }

        let reason = result?;
        info!("Pod watcher finished ({}), {} documents written", reason, self.supervisor.emitted());
        Ok(())
    }
}
