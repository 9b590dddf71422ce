//! Pod watch data models

use futures::stream::BoxStream;
use k8s_openapi::api::core::v1::Pod;
use std::fmt;

use crate::error::PodClientError;

/// Stream of changes produced by a single watch subscription.
///
/// Dropping the stream closes the underlying HTTP connection.
pub type NotificationStream = BoxStream<'static, Result<ChangeNotification, PodClientError>>;

/// Result of listing all pods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodSnapshot {
    /// resourceVersion of the list, used to anchor the following watch
    pub resource_version: String,
    /// Number of pods present at list time
    pub pod_count: usize,
}

/// Error payload of a watch `ERROR` event.
///
/// The API server sends one of these when the subscription is no longer
/// valid, most commonly `410 Gone` once the anchoring resourceVersion has
/// been compacted away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchFailure {
    /// Human-readable message from the API server
    pub message: String,
    /// HTTP-style status code (e.g. 410)
    pub code: u16,
}

impl fmt::Display for WatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// A single change observed on the pod watch.
#[derive(Debug, Clone)]
pub enum ChangeNotification {
    /// Pod created (or first seen by this subscription)
    Added(Pod),
    /// Pod updated
    Modified(Pod),
    /// Pod removed; carries its last known state
    Deleted(Pod),
    /// Subscription invalidated by the API server
    Error(WatchFailure),
}

/// Kind of change carried by a [`ChangeNotification`] with a pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Added => "ADDED",
            Self::Modified => "MODIFIED",
            Self::Deleted => "DELETED",
        };
        f.write_str(kind)
    }
}

impl ChangeNotification {
    /// Splits the notification into its kind and pod.
    ///
    /// Returns `Err` with the failure for `Error` notifications.
    pub fn into_pod(self) -> Result<(ChangeKind, Pod), WatchFailure> {
        match self {
            Self::Added(pod) => Ok((ChangeKind::Added, pod)),
            Self::Modified(pod) => Ok((ChangeKind::Modified, pod)),
            Self::Deleted(pod) => Ok((ChangeKind::Deleted, pod)),
            Self::Error(failure) => Err(failure),
        }
    }
}

/// Namespace-qualified pod identity, rendered as `namespace/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PodKey {
    /// Pod namespace (empty when unset)
    pub namespace: String,
    /// Pod name (empty when unset)
    pub name: String,
}

impl PodKey {
    /// Builds the key of a pod from its metadata.
    #[must_use]
    pub fn of(pod: &Pod) -> Self {
        Self {
            namespace: pod.metadata.namespace.clone().unwrap_or_default(),
            name: pod.metadata.name.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Display for PodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn pod(namespace: Option<&str>, name: Option<&str>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: name.map(str::to_string),
                namespace: namespace.map(str::to_string),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_pod_key_display() {
        let key = PodKey::of(&pod(Some("kube-system"), Some("coredns-1")));
        assert_eq!(key.to_string(), "kube-system/coredns-1");
    }

    #[test]
    fn test_pod_key_missing_metadata() {
        // Mirrors what a bare pod renders as when metadata is absent
        let key = PodKey::of(&pod(None, None));
        assert_eq!(key.to_string(), "/");
    }

    #[test]
    fn test_into_pod_splits_kind() {
        let (kind, p) = ChangeNotification::Deleted(pod(Some("ns"), Some("a")))
            .into_pod()
            .expect("deleted carries a pod");
        assert_eq!(kind, ChangeKind::Deleted);
        assert_eq!(p.metadata.name.as_deref(), Some("a"));

        let failure = WatchFailure {
            message: "too old resource version".to_string(),
            code: 410,
        };
        let err = ChangeNotification::Error(failure.clone())
            .into_pod()
            .expect_err("error carries no pod");
        assert_eq!(err, failure);
        assert_eq!(err.to_string(), "too old resource version (code 410)");
    }
}
