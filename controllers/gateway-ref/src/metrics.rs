//! Controller metrics
//!
//! Reconcile counters and latency histograms, exported in the Prometheus
//! text format by the probe server.

use crate::error::ControllerError;
use crate::reconciler::ReconcileOutcome;
use crds::ObjectKind;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metrics registry for the controller
#[derive(Debug, Clone)]
pub struct Metrics {
    registry: Registry,
    reconciliations: IntCounterVec,
    reconcile_duration: HistogramVec,
}

impl Metrics {
    /// Creates the registry and registers all controller metrics.
    pub fn new() -> Result<Self, ControllerError> {
        let registry = Registry::new();

        let reconciliations = IntCounterVec::new(
            Opts::new(
                "gateway_ref_reconciliations_total",
                "Total number of reconciliations by kind and outcome",
            ),
            &["kind", "outcome"],
        )?;
        registry.register(Box::new(reconciliations.clone()))?;

        let reconcile_duration = HistogramVec::new(
            HistogramOpts::new(
                "gateway_ref_reconcile_duration_seconds",
                "Reconciliation duration in seconds",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(reconcile_duration.clone()))?;

        Ok(Self {
            registry,
            reconciliations,
            reconcile_duration,
        })
    }

    /// Record one reconcile invocation
    pub fn record(&self, kind: ObjectKind, outcome: &ReconcileOutcome, elapsed: Duration) {
        self.reconciliations
            .with_label_values(&[kind.kind(), outcome.label()])
            .inc();
        self.reconcile_duration
            .with_label_values(&[kind.kind()])
            .observe(elapsed.as_secs_f64());
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> Result<String, ControllerError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| ControllerError::Metrics(prometheus::Error::Msg(e.to_string())))
    }
}
