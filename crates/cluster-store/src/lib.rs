//! Cluster Object Store
//!
//! Get-by-identity access to the Istio networking objects the gateway
//! reference controller verifies. Every lookup distinguishes "does not exist"
//! ([`StoreError::NotFound`]) from "could not determine" (every other
//! variant), and is bound to an [`InvocationContext`] so that a cancelled
//! reconcile fails fast instead of waiting on the API server.
//!
//! # Example
//!
//! ```no_run
//! use cluster_store::{InvocationContext, KubeObjectStore, ObjectStore};
//! use crds::{ObjectKind, ScopedIdentity};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = kube::Client::try_default().await?;
//! let store = KubeObjectStore::new(client);
//! let ctx = InvocationContext::new();
//!
//! let gw = store
//!     .get(&ctx, ObjectKind::Gateway, &ScopedIdentity::new("istio-system", "ingress"))
//!     .await?;
//! println!("found {} {}", gw.kind(), gw.identity());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod context;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::KubeObjectStore;
pub use context::InvocationContext;
pub use error::StoreError;
pub use models::StoredObject;
pub use store_trait::ObjectStore;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockObjectStore;
