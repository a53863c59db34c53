//! Prints the CustomResourceDefinitions for the Istio networking kinds the
//! controller watches as a multi-document YAML stream.
//!
//! Intended for local clusters without Istio installed:
//! `cargo run -p crds --bin crdgen | kubectl apply -f -`

use anyhow::Result;
use crds::{DestinationRule, Gateway, VirtualService};
use kube::CustomResourceExt;

fn main() -> Result<()> {
    let crds = [
        VirtualService::crd(),
        Gateway::crd(),
        DestinationRule::crd(),
    ];

    for crd in &crds {
        println!("---");
        print!("{}", serde_yaml::to_string(crd)?);
    }

    Ok(())
}
