//! Website pod verification layer.
//!
//! `WebsitePod` bundles the read-only AWS clients and exposes the checks
//! the integration scenarios perform against a provisioned pod. The
//! service only ever reads provider state; all mutation belongs to the
//! provisioning engine.

mod dns;
mod load_balancer;
mod scaling;
mod service;

pub use load_balancer::LoadBalancerExpectations;
pub use service::WebsitePod;
