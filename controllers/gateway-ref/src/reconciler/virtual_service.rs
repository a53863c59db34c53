//! VirtualService reconciler
//!
//! Verifies that every gateway a VirtualService binds to exists.

use super::{ReconcileOutcome, Reconciler};
use crate::resolver::resolve_gateway_name;
use cluster_store::InvocationContext;
use crds::{DEFAULT_NAMESPACE, ScopedIdentity, VirtualService};
use tracing::{debug, error, info, warn};

impl Reconciler {
    /// Reconciles a VirtualService.
    ///
    /// This method:
    /// 1. Loads the VirtualService (gone means nothing to do)
    /// 2. Resolves each entry of `spec.gateways` against the VirtualService's namespace
    /// 3. Looks each resolved Gateway up, in declaration order
    ///
    /// The first missing Gateway is reported and the remaining references are
    /// not checked.
    pub async fn reconcile_virtual_service(
        &self,
        ctx: &InvocationContext,
        identity: &ScopedIdentity,
    ) -> ReconcileOutcome {
        info!("Reconciling VirtualService {}", identity);

        let vs = match self.store.get_virtual_service(ctx, identity).await {
            Ok(vs) => vs,
            Err(e) if e.is_not_found() => {
                debug!("VirtualService {} no longer exists, nothing to reconcile", identity);
                return ReconcileOutcome::Success;
            }
            Err(e) => {
                error!("Unable to fetch VirtualService {}: {}", identity, e);
                return ReconcileOutcome::TransientError(e);
            }
        };

        let namespace = vs
            .metadata
            .namespace
            .as_deref()
            .unwrap_or(&identity.namespace);

        for raw in &vs.spec.gateways {
            let gateway = resolve_gateway_name(raw, namespace);
            debug!("VirtualService {} gateway {:?} resolved to {}", identity, raw, gateway);

            match self.store.get_gateway(ctx, &gateway).await {
                Ok(_) => {}
                Err(e) if e.is_not_found() => {
                    warn!(
                        "VirtualService {} references missing Gateway {} (as {:?})",
                        identity, gateway, raw
                    );
                    return ReconcileOutcome::NotFound(gateway);
                }
                Err(e) => {
                    error!(
                        "Unable to fetch Gateway {} for VirtualService {}: {}",
                        gateway, identity, e
                    );
                    return ReconcileOutcome::TransientError(e);
                }
            }
        }

        debug!(
            "VirtualService {}: all {} gateway reference(s) exist",
            identity,
            vs.spec.gateways.len()
        );
        ReconcileOutcome::Success
    }
}

/// Whether any of the VirtualService's gateway references resolves to `gateway`.
///
/// Used to map Gateway events back onto the VirtualServices that bind them.
pub fn references_gateway(vs: &VirtualService, gateway: &ScopedIdentity) -> bool {
    let namespace = vs.metadata.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE);
    vs.spec
        .gateways
        .iter()
        .any(|raw| resolve_gateway_name(raw, namespace) == *gateway)
}
