//! Gateway CRD
//!
//! Load balancer operating at the edge of the mesh. The controller only
//! checks that a referenced Gateway exists; its servers are never inspected.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Listeners and workload selector of an edge gateway
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "networking.istio.io",
    version = "v1alpha3",
    kind = "Gateway",
    namespaced,
    shortname = "gw"
)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    /// Labels selecting the gateway workload pods
    #[serde(default)]
    pub selector: BTreeMap<String, String>,

    /// Listeners exposed by the gateway
    #[serde(default)]
    pub servers: Vec<Server>,
}

/// One listener of a gateway
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Port the gateway listens on
    pub port: Port,

    /// Hosts exposed by this listener
    #[serde(default)]
    pub hosts: Vec<String>,
}

/// Port a gateway listener binds
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    /// Port number
    pub number: u32,

    /// Protocol (HTTP, HTTPS, GRPC, HTTP2, MONGO, TCP, TLS)
    pub protocol: String,

    /// Port label
    #[serde(default)]
    pub name: String,
}
