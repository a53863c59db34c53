//! Mesh Gateway Reference CRD Definitions
//!
//! Istio `networking.istio.io` custom resources watched by the gateway
//! reference controller, plus the canonical object identity types shared by
//! the store client and the controller.

pub mod networking;
pub mod references;

pub use networking::*;
pub use references::*;
