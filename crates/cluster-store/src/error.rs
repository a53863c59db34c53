//! Object store errors

use crds::{ObjectKind, ScopedIdentity};
use thiserror::Error;

/// Errors that can occur when fetching an object from the cluster
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object does not exist
    #[error("{kind} {identity} not found")]
    NotFound {
        /// Kind that was requested
        kind: ObjectKind,
        /// Identity that was requested
        identity: ScopedIdentity,
    },

    /// Kubernetes API request/response error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// The invocation was cancelled before the lookup completed
    #[error("Lookup of {0} cancelled")]
    Cancelled(String),

    /// The store answered with a different kind than requested
    #[error("Expected {expected}, store returned {actual}")]
    UnexpectedKind {
        /// Kind that was requested
        expected: ObjectKind,
        /// Kind that was returned
        actual: ObjectKind,
    },

    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the error means the object is absent (as opposed to unknown)
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
