//! Controller-specific error types.
//!
//! Only failures the watcher cannot recover from end up here; transient
//! list/watch errors are retried inside the watch loop and never surface.

use kube::config::{InferConfigError, KubeconfigError};
use thiserror::Error;

/// Errors that can occur in the pod watcher.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Explicit kubeconfig could not be loaded
    #[error("could not load kubeconfig: {0}")]
    Kubeconfig(#[from] KubeconfigError),

    /// No kubeconfig or in-cluster credentials were found
    #[error("could not infer Kubernetes credentials: {0}")]
    InferConfig(#[from] InferConfigError),

    /// Kubernetes client could not be built
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Pod could not be rendered as YAML
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    /// Writing to the document stream failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Shutdown signal handlers could not be installed
    #[error("Signal handling failed: {0}")]
    Signal(String),
}
