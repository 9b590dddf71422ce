//! Test utilities for unit testing the watch loop
//!
//! This module provides helpers for building pods and reading the document stream.

use k8s_openapi::api::core::v1::Pod;
use pod_client::ChangeNotification;
use serde_json::json;

/// Helper to create a single-container test pod
pub fn pod(namespace: &str, name: &str, image: &str) -> Pod {
    serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "resourceVersion": "1"
        },
        "spec": {
            "containers": [{ "name": "main", "image": image }]
        }
    }))
    .expect("valid pod fixture")
}

/// Helper to create a test pod carrying one annotation
pub fn pod_with_annotation(namespace: &str, name: &str, key: &str, value: &str) -> Pod {
    let mut pod = pod(namespace, name, "busybox");
    pod.metadata
        .annotations
        .get_or_insert_with(Default::default)
        .insert(key.to_string(), value.to_string());
    pod
}

/// Helper to create a pod matching the `DEBUG_MODE` marker used across tests
pub fn marked(namespace: &str, name: &str) -> Pod {
    pod_with_annotation(namespace, name, "debug", "DEBUG_MODE")
}

pub fn added(pod: Pod) -> ChangeNotification {
    ChangeNotification::Added(pod)
}

pub fn modified(pod: Pod) -> ChangeNotification {
    ChangeNotification::Modified(pod)
}

pub fn deleted(pod: Pod) -> ChangeNotification {
    ChangeNotification::Deleted(pod)
}

/// Splits the document stream into the pod names it carries, in order
pub fn emitted_names(output: &[u8]) -> Vec<String> {
    let text = std::str::from_utf8(output).expect("utf8 output");
    text.split("---\n")
        .filter(|doc| !doc.trim().is_empty())
        .map(|doc| {
            let pod: Pod = serde_yaml::from_str(doc).expect("each document is a pod");
            pod.metadata.name.unwrap_or_default()
        })
        .collect()
}
