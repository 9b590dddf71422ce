//! Pod List/Watch Client
//!
//! A small client for observing `Pod` resources across every namespace.
//! It exposes the two calls a resilient watch loop is built from: a listing
//! that yields the `resourceVersion` anchoring the cluster state, and a watch
//! that streams changes from that version onward.
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use pod_client::{ChangeNotification, PodClient, PodClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PodClient::new(kube::Client::try_default().await?);
//!
//! // Anchor the watch at the listing's resourceVersion
//! let snapshot = client.list_pods().await?;
//! let mut changes = client.watch_pods(&snapshot.resource_version).await?;
//!
//! while let Some(change) = changes.next().await {
//!     if let Ok(ChangeNotification::Error(failure)) = change {
//!         eprintln!("watch invalidated: {failure}");
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Watch errors sent by the API server are surfaced as
//! [`ChangeNotification::Error`] rather than as a transport failure, so the
//! caller decides how to recover.

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod pod_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::PodClient;
pub use error::PodClientError;
pub use models::*;
pub use pod_trait::PodClientTrait;
#[cfg(feature = "test-util")]
pub use mock::{MockPodClient, WatchSession};
