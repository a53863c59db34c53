//! Kubernetes-backed object store
//!
//! Looks objects up directly against the API server on every call. There is
//! no cache: each reconcile sees the freshest state.

use crate::context::InvocationContext;
use crate::error::StoreError;
use crate::models::StoredObject;
use crate::store_trait::ObjectStore;
use crds::{DestinationRule, Gateway, ObjectKind, ScopedIdentity, VirtualService};
use k8s_openapi::NamespaceResourceScope;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::debug;

/// Object store backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeObjectStore {
    client: Client,
}

impl KubeObjectStore {
    /// Create a store using an existing Kubernetes client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch<K>(&self, kind: ObjectKind, identity: &ScopedIdentity) -> Result<K, StoreError>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + Debug
            + DeserializeOwned,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), &identity.namespace);

        // get_opt maps a 404 to None; every other API failure stays an error
        match api.get_opt(&identity.name).await.map_err(classify)? {
            Some(obj) => {
                debug!("Fetched {} {}", kind, identity);
                Ok(obj)
            }
            None => Err(StoreError::NotFound {
                kind,
                identity: identity.clone(),
            }),
        }
    }
}

/// Transport failures mean the API server could not be reached at all
fn classify(err: kube::Error) -> StoreError {
    match err {
        kube::Error::Service(e) => StoreError::Unavailable(e.to_string()),
        other => StoreError::Kube(other),
    }
}

impl std::fmt::Debug for KubeObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeObjectStore").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ObjectStore for KubeObjectStore {
    async fn get(
        &self,
        ctx: &InvocationContext,
        kind: ObjectKind,
        identity: &ScopedIdentity,
    ) -> Result<StoredObject, StoreError> {
        let what = format!("{} {}", kind, identity);
        ctx.run(what, async {
            let obj: StoredObject = match kind {
                ObjectKind::VirtualService => self
                    .fetch::<VirtualService>(kind, identity)
                    .await?
                    .into(),
                ObjectKind::Gateway => self.fetch::<Gateway>(kind, identity).await?.into(),
                ObjectKind::DestinationRule => self
                    .fetch::<DestinationRule>(kind, identity)
                    .await?
                    .into(),
            };
            Ok::<_, StoreError>(obj)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failure_is_unavailable() {
        let err = kube::Error::Service("connection refused".into());
        assert!(matches!(
            classify(err),
            StoreError::Unavailable(ref m) if m == "connection refused"
        ));
    }

    #[test]
    fn test_other_kube_errors_are_kept() {
        let err = kube::Error::SerdeError(serde_json::from_str::<u32>("nope").unwrap_err());
        assert!(matches!(classify(err), StoreError::Kube(_)));
    }
}
