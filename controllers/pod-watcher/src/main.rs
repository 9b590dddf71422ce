//! Pod Watcher
//!
//! Watches pods across all namespaces and writes every change to a pod whose
//! YAML contains a marker string to stdout, as a stream of YAML documents.
//!
//! With `--stop-on-delete` the watcher locks onto the first matching pod,
//! ignores all others, and exits once that pod is deleted.
//!
//! Logs go to stderr so stdout only ever carries documents.

mod cli;
mod controller;
mod document;
mod error;
mod filter;
mod shutdown;
mod target_lock;
#[cfg(test)]
mod test_utils;
mod watcher;

use clap::Parser;
use controller::Controller;
use crate::cli::Cli;
use crate::error::ControllerError;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let (config, kubeconfig) = Cli::parse().into_config()?;

    info!("Starting pod watcher");
    info!("Configuration:");
    info!("  Marker: {:?}", config.marker);
    info!("  Stop on delete: {}", config.stop_on_delete);
    info!(
        "  Credentials: {}",
        kubeconfig
            .as_deref()
            .map_or_else(|| "default kubeconfig or in-cluster".to_string(), |p| p.display().to_string())
    );

    // kube's rustls backend needs a process-wide crypto provider
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }

    let controller = Controller::new(config, kubeconfig.as_deref()).await?;
    controller.run().await?;

    Ok(())
}
