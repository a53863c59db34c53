//! VirtualService CRD
//!
//! Route rules binding a set of hosts to one or more gateways.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Route rules for a set of hosts and the gateways that apply them
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "networking.istio.io",
    version = "v1alpha3",
    kind = "VirtualService",
    namespaced,
    shortname = "vs"
)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServiceSpec {
    /// Destination hosts the routing rules apply to
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Gateways (and sidecars) that should apply these routes.
    ///
    /// Accepted forms: `name` (same namespace), `./name` and the legacy
    /// `name.namespace[.svc.cluster.local]` FQDN. Any other `prefix/name`
    /// entry is treated as a name in the VirtualService's own namespace.
    #[serde(default)]
    pub gateways: Vec<String>,

    /// Namespaces this VirtualService is exported to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub export_to: Vec<String>,

    /// HTTP routes, evaluated in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub http: Vec<HttpRoute>,
}

/// HTTP route rule
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpRoute {
    /// Route name, used for logging only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Weighted destinations for matched traffic
    #[serde(default)]
    pub route: Vec<HttpRouteDestination>,
}

/// Weighted destination of an HTTP route
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteDestination {
    /// Destination service
    pub destination: Destination,

    /// Share of traffic sent to this destination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}

/// Service a route forwards traffic to
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    /// Service host in the registry
    pub host: String,

    /// DestinationRule subset name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_spec_with_gateways() {
        let spec: VirtualServiceSpec = serde_json::from_value(serde_json::json!({
            "hosts": ["checkout.example.com"],
            "gateways": ["public-gw", "istio-system/shared-gw"],
            "http": [{
                "route": [{ "destination": { "host": "checkout", "subset": "v1" }, "weight": 100 }]
            }],
            "tcp": [{ "ignored": true }]
        }))
        .unwrap();

        assert_eq!(spec.gateways, vec!["public-gw", "istio-system/shared-gw"]);
        assert_eq!(spec.http[0].route[0].destination.subset.as_deref(), Some("v1"));
    }

    #[test]
    fn test_gateways_default_to_empty() {
        let spec: VirtualServiceSpec =
            serde_json::from_value(serde_json::json!({ "hosts": ["a"] })).unwrap();
        assert!(spec.gateways.is_empty());
        assert!(spec.export_to.is_empty());
    }
}
