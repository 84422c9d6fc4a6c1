//! AWS SDK integration: read-only client wrappers used for verification.

pub mod autoscaling;
pub mod cloudwatch;
pub mod ec2;
pub mod elbv2;
pub mod route53;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("Auto Scaling client error: {0}")]
    AutoScalingError(String),
    #[error("CloudWatch client error: {0}")]
    CloudWatchError(String),
    #[error("EC2 client error: {0}")]
    Ec2Error(String),
    #[error("load balancer client error: {0}")]
    ElbError(String),
    #[error("Route 53 client error: {0}")]
    Route53Error(String),
    #[error("unknown instance refresh status {0:?}")]
    UnknownRefreshStatus(String),
}

pub type AwsResult<T> = Result<T, AwsError>;
