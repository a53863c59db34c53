//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the store,
//! reconciler, watchers and probe server together and owns their tasks.
//!
//! Watched kinds:
//! - VirtualService: gateway references must resolve to existing Gateways
//!   (Gateway events requeue the VirtualServices that bind them)
//! - DestinationRule: the rule must be loadable

use crate::backoff::BackoffTracker;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crate::reconciler::Reconciler;
use crate::server::{self, ServerState};
use crate::watcher::Watcher;
use cluster_store::KubeObjectStore;
use crds::{DestinationRule, Gateway, VirtualService};
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

type Task = JoinHandle<Result<(), ControllerError>>;

/// Main controller for gateway reference verification.
pub struct Controller {
    virtual_service_watcher: Task,
    destination_rule_watcher: Task,
    probe_server: Task,
    shutdown: CancellationToken,
}

impl Controller {
    /// Creates a new controller instance and starts its tasks.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing Gateway Reference Controller");

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        let reconciler = Arc::new(Reconciler::new(KubeObjectStore::new(kube_client.clone())));
        let metrics = Arc::new(Metrics::new()?);
        let backoff = Arc::new(BackoffTracker::new(
            config.backoff_min_minutes,
            config.backoff_max_minutes,
        ));
        let shutdown = CancellationToken::new();

        // Create API clients for the watched kinds
        let (virtual_service_api, gateway_api, destination_rule_api): (
            Api<VirtualService>,
            Api<Gateway>,
            Api<DestinationRule>,
        ) = match config.watch_namespace.as_deref() {
            Some(ns) => (
                Api::namespaced(kube_client.clone(), ns),
                Api::namespaced(kube_client.clone(), ns),
                Api::namespaced(kube_client, ns),
            ),
            None => (
                Api::all(kube_client.clone()),
                Api::all(kube_client.clone()),
                Api::all(kube_client),
            ),
        };

        let server_state = Arc::new(ServerState::new(Arc::clone(&metrics)));
        let probe_server = tokio::spawn(server::serve(
            config.metrics_addr,
            Arc::clone(&server_state),
            shutdown.clone(),
        ));

        let watcher_instance = Arc::new(Watcher::new(
            reconciler,
            backoff,
            metrics,
            config,
            shutdown.clone(),
            virtual_service_api,
            gateway_api,
            destination_rule_api,
        ));

        // Start watchers in background tasks
        let virtual_service_watcher = {
            let watcher = Arc::clone(&watcher_instance);
            tokio::spawn(async move { watcher.watch_virtual_services().await })
        };

        let destination_rule_watcher = {
            let watcher = watcher_instance;
            tokio::spawn(async move { watcher.watch_destination_rules().await })
        };

        server_state.mark_ready();

        Ok(Self {
            virtual_service_watcher,
            destination_rule_watcher,
            probe_server,
            shutdown,
        })
    }

    /// Runs the controller until a shutdown signal or a task exits.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("Gateway Reference Controller running");

        // Any task exiting on its own ends the controller
        tokio::select! {
            result = &mut self.virtual_service_watcher => {
                self.shutdown.cancel();
                return task_result("VirtualService watcher", result);
            }
            result = &mut self.destination_rule_watcher => {
                self.shutdown.cancel();
                return task_result("DestinationRule watcher", result);
            }
            result = &mut self.probe_server => {
                self.shutdown.cancel();
                return task_result("Probe server", result);
            }
            () = shutdown_signal() => {
                info!("Shutdown signal received, draining in-flight reconciles");
            }
        }

        self.shutdown.cancel();
        let (virtual_services, destination_rules, probe_server) = tokio::join!(
            self.virtual_service_watcher,
            self.destination_rule_watcher,
            self.probe_server,
        );
        task_result("VirtualService watcher", virtual_services)?;
        task_result("DestinationRule watcher", destination_rules)?;
        task_result("Probe server", probe_server)?;

        info!("Gateway Reference Controller stopped");
        Ok(())
    }
}

fn task_result(
    name: &str,
    result: Result<Result<(), ControllerError>, JoinError>,
) -> Result<(), ControllerError> {
    result.map_err(|e| ControllerError::Watch(format!("{name} panicked: {e}")))?
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
