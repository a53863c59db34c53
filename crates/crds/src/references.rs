//! Kubernetes object identities for Istio networking resources
//!
//! Provides the canonical `namespace/name` identity used for every lookup the
//! controller performs, and the set of object kinds it knows how to fetch.

use kube::runtime::reflector::{Lookup, ObjectRef};
use kube::{Resource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace assumed for objects whose metadata carries no namespace.
pub const DEFAULT_NAMESPACE: &str = "default";

/// API group of every kind the controller handles.
pub const NETWORKING_API_GROUP: &str = "networking.istio.io";

/// Canonical, unambiguous identifier for a namespaced cluster object.
///
/// Equality is structural: two identities are the same object iff both
/// namespace and name match byte for byte.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopedIdentity {
    /// Namespace of the object
    pub namespace: String,

    /// Name of the object
    pub name: String,
}

impl ScopedIdentity {
    /// Create an identity from a namespace and a name
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Identity of a Kubernetes object, taken from its metadata.
    ///
    /// Objects without a namespace are placed in [`DEFAULT_NAMESPACE`].
    pub fn of<K: Resource>(obj: &K) -> Self {
        Self {
            namespace: ResourceExt::namespace(obj)
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            name: ResourceExt::name_any(obj),
        }
    }
}

impl<K: Lookup + ?Sized> From<&ObjectRef<K>> for ScopedIdentity {
    fn from(obj_ref: &ObjectRef<K>) -> Self {
        Self {
            namespace: obj_ref
                .namespace
                .clone()
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            name: obj_ref.name.clone(),
        }
    }
}

impl fmt::Display for ScopedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Kinds of objects the controller reads from the cluster
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Route rule binding hosts to gateways
    VirtualService,

    /// Ingress/egress gateway the route rules bind to
    Gateway,

    /// Traffic policy applied to a destination host
    DestinationRule,
}

impl ObjectKind {
    /// API group of the kind (always `networking.istio.io`)
    pub fn api_group(&self) -> &'static str {
        NETWORKING_API_GROUP
    }

    /// Kubernetes `kind` string
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectKind::VirtualService => "VirtualService",
            ObjectKind::Gateway => "Gateway",
            ObjectKind::DestinationRule => "DestinationRule",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
