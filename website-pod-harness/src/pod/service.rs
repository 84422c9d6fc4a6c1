//! Service struct holding the AWS clients used for verification.

use crate::aws::autoscaling::AsgClient;
use crate::aws::cloudwatch::AlarmClient;
use crate::aws::ec2::Ec2Client;
use crate::aws::elbv2::ElbClient;
use crate::aws::route53::DnsClient;
use crate::error::HarnessResult;

/// Read-only view of a provisioned website pod.
pub struct WebsitePod {
    pub(crate) scaling: AsgClient,
    pub(crate) load_balancing: ElbClient,
    pub(crate) dns: DnsClient,
    pub(crate) compute: Ec2Client,
    pub(crate) alarms: AlarmClient,
}

impl WebsitePod {
    /// Create a service instance with clients from the default AWS
    /// credential provider chain.
    pub async fn new() -> HarnessResult<Self> {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;

        Ok(Self {
            scaling: AsgClient::new(aws_sdk_autoscaling::Client::new(&config)),
            load_balancing: ElbClient::new(aws_sdk_elasticloadbalancingv2::Client::new(&config)),
            dns: DnsClient::new(aws_sdk_route53::Client::new(&config)),
            compute: Ec2Client::new(aws_sdk_ec2::Client::new(&config)),
            alarms: AlarmClient::new(aws_sdk_cloudwatch::Client::new(&config)),
        })
    }

    pub fn scaling(&self) -> &AsgClient {
        &self.scaling
    }

    pub fn load_balancing(&self) -> &ElbClient {
        &self.load_balancing
    }

    pub fn dns(&self) -> &DnsClient {
        &self.dns
    }

    pub fn compute(&self) -> &Ec2Client {
        &self.compute
    }

    pub fn alarms(&self) -> &AlarmClient {
        &self.alarms
    }

    // DNS checks live in dns.rs, load balancer checks in load_balancer.rs,
    // auto-scaling checks in scaling.rs.
}
