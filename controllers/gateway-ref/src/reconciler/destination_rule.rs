//! DestinationRule reconciler

use super::{ReconcileOutcome, Reconciler};
use cluster_store::InvocationContext;
use crds::ScopedIdentity;
use tracing::{debug, error, info};

impl Reconciler {
    /// Reconciles a DestinationRule.
    ///
    /// DestinationRules carry no references to verify; the reconcile only
    /// confirms the object can be loaded.
    pub async fn reconcile_destination_rule(
        &self,
        ctx: &InvocationContext,
        identity: &ScopedIdentity,
    ) -> ReconcileOutcome {
        info!("Reconciling DestinationRule {}", identity);

        match self.store.get_destination_rule(ctx, identity).await {
            Ok(dr) => {
                debug!("DestinationRule {} loaded (host: {})", identity, dr.spec.host);
                ReconcileOutcome::Success
            }
            Err(e) if e.is_not_found() => {
                debug!("DestinationRule {} no longer exists, nothing to reconcile", identity);
                ReconcileOutcome::Success
            }
            Err(e) => {
                error!("Unable to fetch DestinationRule {}: {}", identity, e);
                ReconcileOutcome::TransientError(e)
            }
        }
    }
}
