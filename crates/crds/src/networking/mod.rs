//! Istio networking (`networking.istio.io/v1alpha3`) resources
//!
//! Only the fields the controller and its tooling need are modelled; unknown
//! fields in cluster objects are ignored on deserialization.

pub mod destination_rule;
pub mod gateway;
pub mod virtual_service;

pub use destination_rule::*;
pub use gateway::*;
pub use virtual_service::*;
