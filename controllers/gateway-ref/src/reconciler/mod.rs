//! Reconciliation logic for Istio networking CRDs.
//!
//! Each reconcile loads the object fresh from the store, verifies what it
//! references, and reports a [`ReconcileOutcome`]. The reconciler keeps no
//! state between invocations; requeue timing belongs to the watchers.
//!
//! - `virtual_service`: gateway references must resolve to existing Gateways
//! - `destination_rule`: the rule itself must be loadable

pub mod destination_rule;
pub mod virtual_service;

use cluster_store::{InvocationContext, ObjectStore, StoreError};
use crds::{ObjectKind, ScopedIdentity};
use tracing::debug;

/// Result of a single reconcile invocation
#[derive(Debug)]
pub enum ReconcileOutcome {
    /// Everything referenced exists, or the object itself is gone
    Success,

    /// The first referenced object, in declaration order, that does not exist
    NotFound(ScopedIdentity),

    /// The store could not answer; retry later
    TransientError(StoreError),
}

impl ReconcileOutcome {
    /// Metric/log label for the outcome
    pub fn label(&self) -> &'static str {
        match self {
            ReconcileOutcome::Success => "success",
            ReconcileOutcome::NotFound(_) => "not_found",
            ReconcileOutcome::TransientError(_) => "transient_error",
        }
    }

    /// Whether the scheduler can wait for the next change
    pub fn is_success(&self) -> bool {
        matches!(self, ReconcileOutcome::Success)
    }
}

/// Reconciles Istio networking resources against the cluster object store.
pub struct Reconciler {
    pub(crate) store: Box<dyn ObjectStore + Send + Sync>,
}

impl Reconciler {
    /// Creates a new reconciler reading from `store`.
    pub fn new(store: impl ObjectStore + Send + Sync + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Reconciles the object of `kind` identified by `identity`.
    pub async fn reconcile(
        &self,
        ctx: &InvocationContext,
        kind: ObjectKind,
        identity: &ScopedIdentity,
    ) -> ReconcileOutcome {
        match kind {
            ObjectKind::VirtualService => self.reconcile_virtual_service(ctx, identity).await,
            ObjectKind::DestinationRule => self.reconcile_destination_rule(ctx, identity).await,
            ObjectKind::Gateway => {
                // Gateways are only ever looked up, never reconciled themselves
                debug!("Nothing to reconcile for Gateway {}", identity);
                ReconcileOutcome::Success
            }
        }
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}
