//! Pod list/watch client over the Kubernetes API

use async_trait::async_trait;
use futures::{StreamExt, future};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams, WatchEvent, WatchParams};
use kube::Client;
use tracing::debug;

use crate::error::PodClientError;
use crate::models::{ChangeNotification, NotificationStream, PodSnapshot, WatchFailure};
use crate::pod_trait::PodClientTrait;

/// Pod client watching every namespace of the cluster.
#[derive(Clone)]
pub struct PodClient {
    api: Api<Pod>,
}

impl std::fmt::Debug for PodClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PodClient").finish_non_exhaustive()
    }
}

impl PodClient {
    /// Create a new pod client scoped to all namespaces
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }
}

/// Translates a raw watch event into a notification.
///
/// Bookmarks are dropped; they are never requested.
fn translate(event: Result<WatchEvent<Pod>, kube::Error>) -> Option<Result<ChangeNotification, PodClientError>> {
    match event {
        Ok(WatchEvent::Added(pod)) => Some(Ok(ChangeNotification::Added(pod))),
        Ok(WatchEvent::Modified(pod)) => Some(Ok(ChangeNotification::Modified(pod))),
        Ok(WatchEvent::Deleted(pod)) => Some(Ok(ChangeNotification::Deleted(pod))),
        Ok(WatchEvent::Bookmark(bookmark)) => {
            debug!("Ignoring bookmark at resourceVersion {}", bookmark.metadata.resource_version);
            None
        }
        Ok(WatchEvent::Error(status)) => Some(Ok(ChangeNotification::Error(WatchFailure {
            message: status.message,
            code: status.code,
        }))),
        Err(kube::Error::SerdeError(e)) => Some(Err(PodClientError::UnexpectedPayload(e.to_string()))),
        Err(e) => Some(Err(PodClientError::Kube(e))),
    }
}

#[async_trait]
impl PodClientTrait for PodClient {
    async fn list_pods(&self) -> Result<PodSnapshot, PodClientError> {
        let list = self.api.list(&ListParams::default()).await?;
        let resource_version = list
            .metadata
            .resource_version
            .filter(|rv| !rv.is_empty())
            .ok_or(PodClientError::MissingResourceVersion)?;

        debug!("Listed {} pods at resourceVersion {}", list.items.len(), resource_version);
        Ok(PodSnapshot {
            resource_version,
            pod_count: list.items.len(),
        })
    }

    async fn watch_pods(&self, resource_version: &str) -> Result<NotificationStream, PodClientError> {
        let events = self
            .api
            .watch(&WatchParams::default(), resource_version)
            .await?;
        debug!("Opened pod watch at resourceVersion {}", resource_version);

        Ok(events
            .filter_map(|event| future::ready(translate(event)))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod_event(kind: &str) -> WatchEvent<Pod> {
        serde_json::from_value(json!({
            "type": kind,
            "object": {
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": { "name": "web-0", "namespace": "default" }
            }
        }))
        .expect("valid pod watch event")
    }

    #[test]
    fn test_translate_pod_events() {
        assert!(matches!(
            translate(Ok(pod_event("ADDED"))),
            Some(Ok(ChangeNotification::Added(_)))
        ));
        assert!(matches!(
            translate(Ok(pod_event("MODIFIED"))),
            Some(Ok(ChangeNotification::Modified(_)))
        ));
        assert!(matches!(
            translate(Ok(pod_event("DELETED"))),
            Some(Ok(ChangeNotification::Deleted(_)))
        ));
    }

    #[test]
    fn test_translate_error_event() {
        let event: WatchEvent<Pod> = serde_json::from_value(json!({
            "type": "ERROR",
            "object": {
                "apiVersion": "v1",
                "kind": "Status",
                "status": "Failure",
                "message": "too old resource version: 1 (42)",
                "reason": "Expired",
                "code": 410
            }
        }))
        .expect("valid error watch event");

        match translate(Ok(event)) {
            Some(Ok(ChangeNotification::Error(failure))) => {
                assert_eq!(failure.code, 410);
                assert!(failure.message.contains("too old resource version"));
            }
            other => panic!("expected error notification, got {other:?}"),
        }
    }

    #[test]
    fn test_translate_undecodable_event_is_skippable() {
        let decode_error = serde_json::from_str::<Pod>("not json").expect_err("invalid json");
        let translated = translate(Err(kube::Error::SerdeError(decode_error)));
        match translated {
            Some(Err(e)) => assert!(e.is_unexpected_payload()),
            other => panic!("expected unexpected payload error, got {other:?}"),
        }
    }
}
