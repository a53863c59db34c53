//! Mock ObjectStore for unit testing
//!
//! Stores objects in memory, can be told to fail specific lookups, and keeps
//! a log of every lookup so tests can assert on evaluation order.

use crate::context::InvocationContext;
use crate::error::StoreError;
use crate::models::StoredObject;
use crate::store_trait::ObjectStore;
use crds::{
    DestinationRule, DestinationRuleSpec, Gateway, GatewaySpec, ObjectKind, ScopedIdentity,
    VirtualService, VirtualServiceSpec,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Key = (ObjectKind, ScopedIdentity);

/// In-memory object store for tests
#[derive(Debug, Clone, Default)]
pub struct MockObjectStore {
    objects: Arc<Mutex<HashMap<Key, StoredObject>>>,
    failures: Arc<Mutex<HashMap<Key, String>>>,
    calls: Arc<Mutex<Vec<Key>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockObjectStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the mock store (for test setup)
    pub fn insert(&self, obj: impl Into<StoredObject>) {
        let obj = obj.into();
        lock(&self.objects).insert((obj.kind(), obj.identity()), obj);
    }

    /// Add a Gateway with an empty spec
    pub fn add_gateway(&self, namespace: &str, name: &str) {
        let mut gw = Gateway::new(name, GatewaySpec::default());
        gw.metadata.namespace = Some(namespace.to_string());
        self.insert(gw);
    }

    /// Add a VirtualService binding the given gateway references
    pub fn add_virtual_service(&self, namespace: &str, name: &str, gateways: &[&str]) {
        let mut vs = VirtualService::new(
            name,
            VirtualServiceSpec {
                gateways: gateways.iter().map(|g| (*g).to_string()).collect(),
                ..Default::default()
            },
        );
        vs.metadata.namespace = Some(namespace.to_string());
        self.insert(vs);
    }

    /// Add a DestinationRule for a host
    pub fn add_destination_rule(&self, namespace: &str, name: &str, host: &str) {
        let mut dr = DestinationRule::new(
            name,
            DestinationRuleSpec {
                host: host.to_string(),
                ..Default::default()
            },
        );
        dr.metadata.namespace = Some(namespace.to_string());
        self.insert(dr);
    }

    /// Remove an object, simulating deletion
    pub fn remove(&self, kind: ObjectKind, identity: &ScopedIdentity) {
        lock(&self.objects).remove(&(kind, identity.clone()));
    }

    /// Make every lookup of `identity` fail with [`StoreError::Unavailable`]
    pub fn fail_with(&self, kind: ObjectKind, identity: &ScopedIdentity, message: &str) {
        lock(&self.failures).insert((kind, identity.clone()), message.to_string());
    }

    /// Every lookup performed so far, in order
    pub fn calls(&self) -> Vec<(ObjectKind, ScopedIdentity)> {
        lock(&self.calls).clone()
    }

    /// Forget the lookup log
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }
}

#[async_trait::async_trait]
impl ObjectStore for MockObjectStore {
    async fn get(
        &self,
        ctx: &InvocationContext,
        kind: ObjectKind,
        identity: &ScopedIdentity,
    ) -> Result<StoredObject, StoreError> {
        let key = (kind, identity.clone());
        lock(&self.calls).push(key.clone());

        let what = format!("{} {}", kind, identity);
        ctx.run(what, async {
            if let Some(message) = lock(&self.failures).get(&key) {
                return Err(StoreError::Unavailable(message.clone()));
            }
            lock(&self.objects)
                .get(&key)
                .cloned()
                .ok_or_else(|| StoreError::NotFound {
                    kind,
                    identity: identity.clone(),
                })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_existing_and_missing() {
        let store = MockObjectStore::new();
        store.add_gateway("istio-system", "ingress");
        let ctx = InvocationContext::new();

        let found = store
            .get_gateway(&ctx, &ScopedIdentity::new("istio-system", "ingress"))
            .await
            .unwrap();
        assert_eq!(found.metadata.name.as_deref(), Some("ingress"));

        let missing = store
            .get(&ctx, ObjectKind::Gateway, &ScopedIdentity::new("default", "ingress"))
            .await
            .unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn test_kind_is_part_of_the_key() {
        let store = MockObjectStore::new();
        store.add_gateway("default", "checkout");
        let ctx = InvocationContext::new();

        let err = store
            .get_virtual_service(&ctx, &ScopedIdentity::new("default", "checkout"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_injected_failure_and_call_log() {
        let store = MockObjectStore::new();
        let id = ScopedIdentity::new("default", "gw");
        store.add_gateway("default", "gw");
        store.fail_with(ObjectKind::Gateway, &id, "connection refused");
        let ctx = InvocationContext::new();

        let err = store.get(&ctx, ObjectKind::Gateway, &id).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(ref m) if m == "connection refused"));
        assert_eq!(store.calls(), vec![(ObjectKind::Gateway, id)]);
    }

    #[tokio::test]
    async fn test_cancelled_context() {
        let store = MockObjectStore::new();
        store.add_gateway("default", "gw");
        let ctx = InvocationContext::new();
        ctx.cancel();

        let err = store
            .get(&ctx, ObjectKind::Gateway, &ScopedIdentity::new("default", "gw"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Cancelled(_)));
    }
}
