//! Pod client errors

use thiserror::Error;

/// Errors that can occur when listing or watching pods
#[derive(Debug, Error)]
pub enum PodClientError {
    /// Kubernetes API or transport error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// The list response did not carry a resourceVersion to anchor a watch
    #[error("pod list response carried no resourceVersion")]
    MissingResourceVersion,

    /// A watch event whose object could not be decoded as a Pod
    #[error("unexpected watch payload: {0}")]
    UnexpectedPayload(String),
}

impl PodClientError {
    /// Whether this error only affects a single watch event.
    ///
    /// Such errors are skipped by the caller; every other error ends the
    /// watch session.
    #[must_use]
    pub fn is_unexpected_payload(&self) -> bool {
        matches!(self, Self::UnexpectedPayload(_))
    }
}
