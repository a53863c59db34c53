//! Objects returned by the store

use crate::error::StoreError;
use crds::{DestinationRule, Gateway, ObjectKind, ScopedIdentity, VirtualService};

/// An object fetched from the cluster, tagged with its kind
#[derive(Debug, Clone)]
pub enum StoredObject {
    /// A route rule
    VirtualService(Box<VirtualService>),
    /// A gateway
    Gateway(Box<Gateway>),
    /// A traffic policy rule
    DestinationRule(Box<DestinationRule>),
}

impl StoredObject {
    /// Kind of the wrapped object
    pub fn kind(&self) -> ObjectKind {
        match self {
            StoredObject::VirtualService(_) => ObjectKind::VirtualService,
            StoredObject::Gateway(_) => ObjectKind::Gateway,
            StoredObject::DestinationRule(_) => ObjectKind::DestinationRule,
        }
    }

    /// Identity of the wrapped object, taken from its metadata
    pub fn identity(&self) -> ScopedIdentity {
        match self {
            StoredObject::VirtualService(vs) => ScopedIdentity::of(vs.as_ref()),
            StoredObject::Gateway(gw) => ScopedIdentity::of(gw.as_ref()),
            StoredObject::DestinationRule(dr) => ScopedIdentity::of(dr.as_ref()),
        }
    }

    /// Unwrap a VirtualService, or report which kind was found instead
    pub fn into_virtual_service(self) -> Result<VirtualService, StoreError> {
        match self {
            StoredObject::VirtualService(vs) => Ok(*vs),
            other => Err(StoreError::UnexpectedKind {
                expected: ObjectKind::VirtualService,
                actual: other.kind(),
            }),
        }
    }

    /// Unwrap a Gateway, or report which kind was found instead
    pub fn into_gateway(self) -> Result<Gateway, StoreError> {
        match self {
            StoredObject::Gateway(gw) => Ok(*gw),
            other => Err(StoreError::UnexpectedKind {
                expected: ObjectKind::Gateway,
                actual: other.kind(),
            }),
        }
    }

    /// Unwrap a DestinationRule, or report which kind was found instead
    pub fn into_destination_rule(self) -> Result<DestinationRule, StoreError> {
        match self {
            StoredObject::DestinationRule(dr) => Ok(*dr),
            other => Err(StoreError::UnexpectedKind {
                expected: ObjectKind::DestinationRule,
                actual: other.kind(),
            }),
        }
    }
}

impl From<VirtualService> for StoredObject {
    fn from(vs: VirtualService) -> Self {
        StoredObject::VirtualService(Box::new(vs))
    }
}

impl From<Gateway> for StoredObject {
    fn from(gw: Gateway) -> Self {
        StoredObject::Gateway(Box::new(gw))
    }
}

impl From<DestinationRule> for StoredObject {
    fn from(dr: DestinationRule) -> Self {
        StoredObject::DestinationRule(Box::new(dr))
    }
}
