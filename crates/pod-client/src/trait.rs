//! PodClient trait for mocking
//!
//! This trait abstracts the pod list/watch calls so the watch loop can be
//! driven by a scripted client in unit tests.

use crate::error::PodClientError;
use crate::models::{NotificationStream, PodSnapshot};

/// Trait for pod list/watch operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait PodClientTrait: Send + Sync {
    /// Lists pods in all namespaces and returns the anchoring resourceVersion.
    async fn list_pods(&self) -> Result<PodSnapshot, PodClientError>;

    /// Opens a watch on pods in all namespaces starting at `resource_version`.
    ///
    /// The returned stream is not restartable; once it ends, a fresh
    /// listing is required before watching again.
    async fn watch_pods(&self, resource_version: &str) -> Result<NotificationStream, PodClientError>;
}
