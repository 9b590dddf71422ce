//! Mock PodClient for unit testing
//!
//! This module provides a scripted implementation of `PodClientTrait` that can
//! be used to drive a watch loop without a running cluster.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use tokio_util::sync::CancellationToken;

use crate::error::PodClientError;
use crate::models::{ChangeNotification, NotificationStream, PodSnapshot};
use crate::pod_trait::PodClientTrait;

/// Items one scripted watch subscription yields, in order.
#[derive(Debug, Default)]
pub struct WatchSession {
    items: Vec<Result<ChangeNotification, PodClientError>>,
    hold_open: bool,
}

impl WatchSession {
    /// Session yielding the given notifications, then closing
    pub fn new(notifications: impl IntoIterator<Item = ChangeNotification>) -> Self {
        Self {
            items: notifications.into_iter().map(Ok).collect(),
            hold_open: false,
        }
    }

    /// Append a notification
    #[must_use]
    pub fn then(mut self, notification: ChangeNotification) -> Self {
        self.items.push(Ok(notification));
        self
    }

    /// Append an item that fails to decode as a Pod
    #[must_use]
    pub fn then_undecodable(mut self, detail: &str) -> Self {
        self.items
            .push(Err(PodClientError::UnexpectedPayload(detail.to_string())));
        self
    }

    /// Append a transport failure, which ends the session
    #[must_use]
    pub fn then_transport_error(mut self, detail: &str) -> Self {
        self.items.push(Err(transient_error(detail)));
        self
    }

    /// Keep the subscription open (never yielding) after the scripted items
    #[must_use]
    pub fn held_open(mut self) -> Self {
        self.hold_open = true;
        self
    }
}

/// Builds a transport-level error like a refused connection.
#[must_use]
pub fn transient_error(detail: &str) -> PodClientError {
    PodClientError::Kube(kube::Error::Service(Box::new(std::io::Error::other(
        detail.to_string(),
    ))))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock PodClient for testing
///
/// List and watch calls consume scripted responses in order. Once the
/// scripted watch sessions are used up, the next watch cancels the token
/// passed to [`MockPodClient::new`] and hangs, so a loop under test shuts
/// down the same way it would on an operator interrupt.
#[derive(Debug, Clone)]
pub struct MockPodClient {
    list_results: Arc<Mutex<VecDeque<Result<PodSnapshot, PodClientError>>>>,
    sessions: Arc<Mutex<VecDeque<Result<WatchSession, PodClientError>>>>,
    list_calls: Arc<Mutex<usize>>,
    watched_versions: Arc<Mutex<Vec<String>>>,
    on_exhausted: CancellationToken,
}

impl MockPodClient {
    /// Create a new mock client cancelling `on_exhausted` when the script runs out
    #[must_use]
    pub fn new(on_exhausted: CancellationToken) -> Self {
        Self {
            list_results: Arc::new(Mutex::new(VecDeque::new())),
            sessions: Arc::new(Mutex::new(VecDeque::new())),
            list_calls: Arc::new(Mutex::new(0)),
            watched_versions: Arc::new(Mutex::new(Vec::new())),
            on_exhausted,
        }
    }

    /// Script a failing list call
    ///
    /// Lists without a scripted result succeed with resourceVersion `rv-<n>`,
    /// `n` being the 1-based number of the call.
    pub fn fail_next_list(&self, error: PodClientError) {
        lock(&self.list_results).push_back(Err(error));
    }

    /// Script a successful list call with an explicit resourceVersion
    pub fn push_list(&self, resource_version: &str, pod_count: usize) {
        lock(&self.list_results).push_back(Ok(PodSnapshot {
            resource_version: resource_version.to_string(),
            pod_count,
        }));
    }

    /// Script the next watch subscription
    pub fn push_session(&self, session: WatchSession) {
        lock(&self.sessions).push_back(Ok(session));
    }

    /// Script a watch call that fails to open
    pub fn fail_next_watch(&self, error: PodClientError) {
        lock(&self.sessions).push_back(Err(error));
    }

    /// Number of list calls made so far
    #[must_use]
    pub fn list_calls(&self) -> usize {
        *lock(&self.list_calls)
    }

    /// resourceVersions every watch was opened with, in call order
    #[must_use]
    pub fn watched_versions(&self) -> Vec<String> {
        lock(&self.watched_versions).clone()
    }
}

#[async_trait]
impl PodClientTrait for MockPodClient {
    async fn list_pods(&self) -> Result<PodSnapshot, PodClientError> {
        let call = {
            let mut calls = lock(&self.list_calls);
            *calls += 1;
            *calls
        };
        lock(&self.list_results).pop_front().unwrap_or_else(|| {
            Ok(PodSnapshot {
                resource_version: format!("rv-{call}"),
                pod_count: 0,
            })
        })
    }

    async fn watch_pods(&self, resource_version: &str) -> Result<NotificationStream, PodClientError> {
        lock(&self.watched_versions).push(resource_version.to_string());

        let Some(next) = lock(&self.sessions).pop_front() else {
            self.on_exhausted.cancel();
            return Ok(stream::pending().boxed());
        };

        let session = next?;
        let items = stream::iter(session.items);
        if session.hold_open {
            Ok(items.chain(stream::pending()).boxed())
        } else {
            Ok(items.boxed())
        }
    }
}
