//! Test utilities for unit testing reconcilers
//!
//! This module provides helpers for creating test data and setting up test scenarios.

use crate::reconciler::Reconciler;
use cluster_store::MockObjectStore;
use crds::{VirtualService, VirtualServiceSpec};

/// Reconciler reading from a clone of `store`.
///
/// Clones share their contents, so the test keeps full control over `store`
/// (seeding objects, injecting failures, reading the call log).
pub fn test_reconciler(store: &MockObjectStore) -> Reconciler {
    Reconciler::new(store.clone())
}

/// Helper to create a test VirtualService CRD
pub fn create_test_virtual_service(
    namespace: &str,
    name: &str,
    gateways: &[&str],
) -> VirtualService {
    let mut vs = VirtualService::new(
        name,
        VirtualServiceSpec {
            hosts: vec![format!("{name}.example.com")],
            gateways: gateways.iter().map(|g| (*g).to_string()).collect(),
            ..Default::default()
        },
    );
    vs.metadata.namespace = Some(namespace.to_string());
    vs
}
