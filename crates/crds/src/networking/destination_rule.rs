//! DestinationRule CRD
//!
//! Traffic policies applied after routing has occurred. Carries no outbound
//! references the controller has to verify.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Traffic policy applied to a destination host
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "networking.istio.io",
    version = "v1alpha3",
    kind = "DestinationRule",
    namespaced,
    shortname = "dr"
)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRuleSpec {
    /// Service host the rule applies to
    pub host: String,

    /// Named versions of the service
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsets: Vec<Subset>,

    /// Namespaces this DestinationRule is exported to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub export_to: Vec<String>,
}

/// Named group of endpoints of the destination host
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subset {
    /// Subset name, referenced from VirtualService destinations
    pub name: String,

    /// Endpoint labels selecting the subset
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}
