//! ObjectStore trait for mocking
//!
//! This trait abstracts cluster object lookups so the reconciler can be
//! exercised against an in-memory store in unit tests. The concrete
//! [`KubeObjectStore`](crate::KubeObjectStore) implements it against the API
//! server.

use crate::context::InvocationContext;
use crate::error::StoreError;
use crate::models::StoredObject;
use crds::{DestinationRule, Gateway, ObjectKind, ScopedIdentity, VirtualService};

/// Get-by-identity access to cluster objects
///
/// Implementations must return [`StoreError::NotFound`] when, and only when,
/// the object does not exist. All async methods must be `Send` to work with
/// Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object of the given kind by identity
    async fn get(
        &self,
        ctx: &InvocationContext,
        kind: ObjectKind,
        identity: &ScopedIdentity,
    ) -> Result<StoredObject, StoreError>;

    /// Fetch a VirtualService
    async fn get_virtual_service(
        &self,
        ctx: &InvocationContext,
        identity: &ScopedIdentity,
    ) -> Result<VirtualService, StoreError> {
        self.get(ctx, ObjectKind::VirtualService, identity)
            .await?
            .into_virtual_service()
    }

    /// Fetch a Gateway
    async fn get_gateway(
        &self,
        ctx: &InvocationContext,
        identity: &ScopedIdentity,
    ) -> Result<Gateway, StoreError> {
        self.get(ctx, ObjectKind::Gateway, identity)
            .await?
            .into_gateway()
    }

    /// Fetch a DestinationRule
    async fn get_destination_rule(
        &self,
        ctx: &InvocationContext,
        identity: &ScopedIdentity,
    ) -> Result<DestinationRule, StoreError> {
        self.get(ctx, ObjectKind::DestinationRule, identity)
            .await?
            .into_destination_rule()
    }
}
