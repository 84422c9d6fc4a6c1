//! This crate provides the core logic for the website pod integration
//! harness:
//! - instance-refresh convergence waiting for auto-scaling groups
//! - Terraform invocation with tfvars assembly and JSON output retrieval
//! - read-only AWS client wrappers used to verify provisioned resources
//!

pub mod aws;
mod error;
pub mod pod;
mod probe;
pub mod refresh;
pub mod terraform;

// Re-exports for a small, focused public API
pub use aws::AwsError;
pub use error::{HarnessError, HarnessResult};
pub use pod::{LoadBalancerExpectations, WebsitePod};
pub use probe::{fetch, ProbeResponse};
pub use refresh::{
    wait_for_instance_refresh, RefreshStatus, RefreshStatusSource, DEFAULT_POLL_INTERVAL,
};
pub use terraform::{Deployment, TerraformOutputs, TerraformRunner, TfValue, TfVars};
