//! Kubernetes resource watchers.
//!
//! This module handles watching Kubernetes resources for changes and
//! triggering reconciliation using `kube_runtime::Controller`, which takes
//! care of reconnection, per-object serialisation and requeue scheduling.
//!
//! Outcomes map onto requeue actions as follows:
//! - `Success`: wait for the next change, forget the object's backoff
//! - `NotFound`: requeue after the object's next backoff delay
//! - `TransientError`: returned as an error; `error_policy` requeues with backoff

use crate::backoff::BackoffTracker;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crate::reconciler::virtual_service::references_gateway;
use crate::reconciler::{ReconcileOutcome, Reconciler};
use cluster_store::InvocationContext;
use crds::{DestinationRule, Gateway, ObjectKind, ScopedIdentity, VirtualService};
use futures::{StreamExt, future};
use kube::{Api, Resource};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::controller::{self, Action, Config as RuntimeConfig};
use kube_runtime::{Controller, watcher};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Everything a reconcile invocation for one watched kind needs
pub struct WatchContext {
    kind: ObjectKind,
    reconciler: Arc<Reconciler>,
    backoff: Arc<BackoffTracker>,
    metrics: Arc<Metrics>,
    shutdown: InvocationContext,
}

/// Reconcile entry point handed to `kube_runtime::Controller`.
///
/// Only the object's identity is used; the reconciler reloads the object
/// from the store itself.
async fn reconcile_object<K>(
    obj: Arc<K>,
    ctx: Arc<WatchContext>,
) -> Result<Action, ControllerError>
where
    K: Resource,
{
    let identity = ScopedIdentity::of(obj.as_ref());
    let invocation = ctx.shutdown.child();

    let started = Instant::now();
    let outcome = ctx.reconciler.reconcile(&invocation, ctx.kind, &identity).await;
    ctx.metrics.record(ctx.kind, &outcome, started.elapsed());
    if !outcome.is_success() {
        debug!("{} {} reconciled as {}", ctx.kind, identity, outcome.label());
    }

    next_action(&ctx.backoff, ctx.kind, &identity, outcome)
}

/// Translate a reconcile outcome into the scheduler's next action
pub(crate) fn next_action(
    backoff: &BackoffTracker,
    kind: ObjectKind,
    identity: &ScopedIdentity,
    outcome: ReconcileOutcome,
) -> Result<Action, ControllerError> {
    match outcome {
        ReconcileOutcome::Success => {
            backoff.reset(kind, identity);
            Ok(Action::await_change())
        }
        ReconcileOutcome::NotFound(missing) => {
            let delay = backoff.next_delay(kind, identity);
            info!(
                "{} {} waiting for {}, requeue in {}s",
                kind,
                identity,
                missing,
                delay.as_secs()
            );
            Ok(Action::requeue(delay))
        }
        ReconcileOutcome::TransientError(e) => Err(ControllerError::Store(e)),
    }
}

fn error_policy<K>(obj: Arc<K>, error: &ControllerError, ctx: Arc<WatchContext>) -> Action
where
    K: Resource,
{
    let identity = ScopedIdentity::of(obj.as_ref());
    let delay = ctx.backoff.next_delay(ctx.kind, &identity);
    error!(
        "Reconciliation error for {} {}: {}, requeue in {}s",
        ctx.kind,
        identity,
        error,
        delay.as_secs()
    );
    Action::requeue(delay)
}

/// Drop the backoff state of objects the scheduler reports as gone.
///
/// A deleted object is never reconciled again, so its entry would otherwise
/// outlive it. Returns whether the error was such a report.
pub(crate) fn forget_deleted<QueueErr>(
    backoff: &BackoffTracker,
    kind: ObjectKind,
    error: &controller::Error<ControllerError, QueueErr>,
) -> bool
where
    QueueErr: std::error::Error + 'static,
{
    match error {
        controller::Error::ObjectNotFound(obj_ref) => {
            let identity = ScopedIdentity::from(obj_ref);
            debug!("{} {} deleted, dropping its backoff", kind, identity);
            backoff.reset(kind, &identity);
            true
        }
        _ => false,
    }
}

/// Drive a configured `kube_runtime::Controller` until shutdown.
async fn run_controller<K>(
    controller: Controller<K>,
    ctx: Arc<WatchContext>,
    config: &ControllerConfig,
    shutdown: CancellationToken,
) -> Result<(), ControllerError>
where
    K: Resource + Clone + Send + Sync + 'static + Debug + DeserializeOwned,
    K::DynamicType: Default + Eq + Hash + Clone + Debug + Unpin,
{
    let kind = ctx.kind;
    let backoff = Arc::clone(&ctx.backoff);
    info!("Starting {} watcher ({})", kind, kind.api_group());

    let runtime_config = RuntimeConfig::default()
        .debounce(config.debounce)
        .concurrency(config.reconcile_concurrency);

    controller
        .with_config(runtime_config)
        .graceful_shutdown_on(async move { shutdown.cancelled().await })
        .run(reconcile_object::<K>, error_policy::<K>, ctx)
        .for_each(|res| {
            match res {
                Ok((obj_ref, action)) => debug!(
                    "Reconciled {} {}: {:?}",
                    kind,
                    ScopedIdentity::from(&obj_ref),
                    action
                ),
                Err(e) => {
                    if !forget_deleted(&backoff, kind, &e) {
                        warn!("{} controller error: {}", kind, e);
                    }
                }
            }
            future::ready(())
        })
        .await;

    info!("{} watcher stopped", kind);
    Ok(())
}

/// Watches Kubernetes resources for changes.
pub struct Watcher {
    reconciler: Arc<Reconciler>,
    backoff: Arc<BackoffTracker>,
    metrics: Arc<Metrics>,
    config: ControllerConfig,
    shutdown: CancellationToken,
    virtual_service_api: Api<VirtualService>,
    gateway_api: Api<Gateway>,
    destination_rule_api: Api<DestinationRule>,
}

impl Watcher {
    /// Creates a new watcher instance.
    #[allow(clippy::too_many_arguments, reason = "one handle per watched kind")]
    pub fn new(
        reconciler: Arc<Reconciler>,
        backoff: Arc<BackoffTracker>,
        metrics: Arc<Metrics>,
        config: ControllerConfig,
        shutdown: CancellationToken,
        virtual_service_api: Api<VirtualService>,
        gateway_api: Api<Gateway>,
        destination_rule_api: Api<DestinationRule>,
    ) -> Self {
        Self {
            reconciler,
            backoff,
            metrics,
            config,
            shutdown,
            virtual_service_api,
            gateway_api,
            destination_rule_api,
        }
    }

    fn context(&self, kind: ObjectKind) -> Arc<WatchContext> {
        Arc::new(WatchContext {
            kind,
            reconciler: Arc::clone(&self.reconciler),
            backoff: Arc::clone(&self.backoff),
            metrics: Arc::clone(&self.metrics),
            shutdown: InvocationContext::with_token(self.shutdown.child_token()),
        })
    }

    /// Starts watching VirtualService resources.
    ///
    /// Gateway events requeue every cached VirtualService whose references
    /// resolve to the changed Gateway, so a Gateway created after its
    /// VirtualService is picked up without waiting for the backoff.
    pub async fn watch_virtual_services(&self) -> Result<(), ControllerError> {
        let controller = Controller::new(
            self.virtual_service_api.clone(),
            watcher::Config::default(),
        );
        let virtual_services = controller.store();

        let controller = controller.watches(
            self.gateway_api.clone(),
            watcher::Config::default(),
            move |gateway: Gateway| {
                let gateway = ScopedIdentity::of(&gateway);
                virtual_services
                    .state()
                    .into_iter()
                    .filter(|vs| references_gateway(vs, &gateway))
                    .map(|vs| ObjectRef::from_obj(vs.as_ref()))
                    .collect::<Vec<_>>()
            },
        );

        run_controller(
            controller,
            self.context(ObjectKind::VirtualService),
            &self.config,
            self.shutdown.clone(),
        )
        .await
    }

    /// Starts watching DestinationRule resources.
    pub async fn watch_destination_rules(&self) -> Result<(), ControllerError> {
        let controller = Controller::new(
            self.destination_rule_api.clone(),
            watcher::Config::default(),
        );

        run_controller(
            controller,
            self.context(ObjectKind::DestinationRule),
            &self.config,
            self.shutdown.clone(),
        )
        .await
    }
}
