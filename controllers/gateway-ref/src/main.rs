//! Gateway Reference Controller
//!
//! Keeps Istio networking configuration internally consistent:
//! - VirtualService: every entry of `spec.gateways` must resolve to an
//!   existing Gateway (short name, `./name` or legacy FQDN forms)
//! - DestinationRule: must be loadable
//!
//! The controller never writes to the cluster; it reports and requeues.

mod backoff;
mod config;
mod controller;
mod error;
mod metrics;
mod reconciler;
mod resolver;
mod server;
#[cfg(test)]
mod test_utils;
mod watcher;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Initialize rustls crypto provider (needed for Kubernetes TLS client)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    info!("Starting Gateway Reference Controller");

    // Load configuration from environment variables
    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!(
        "  Namespace: {}",
        config.watch_namespace.as_deref().unwrap_or("all namespaces")
    );
    info!("  Reconcile concurrency: {}", config.reconcile_concurrency);
    info!("  Debounce: {:?}", config.debounce);
    info!(
        "  Backoff: {}m..{}m",
        config.backoff_min_minutes, config.backoff_max_minutes
    );
    info!("  Metrics address: {}", config.metrics_addr);

    // Initialize and run controller
    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
