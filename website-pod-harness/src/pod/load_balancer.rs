//! Load balancer verification: scheme, availability zones, listeners,
//! forward rules, and backend health.

use aws_sdk_elasticloadbalancingv2::types::LoadBalancer;

use crate::error::{HarnessError, HarnessResult};

/// Expectations for the pod's single load balancer.
pub struct LoadBalancerExpectations {
    pub scheme: String,
    pub availability_zones: usize,
    pub listeners: usize,
    pub healthy_targets: usize,
}

impl Default for LoadBalancerExpectations {
    fn default() -> Self {
        Self {
            scheme: "internet-facing".to_string(),
            availability_zones: 3,
            listeners: 2,
            healthy_targets: 3,
        }
    }
}

impl super::service::WebsitePod {
    /// The account's single load balancer. More or fewer than one means
    /// the apply did not converge to the expected topology.
    pub async fn the_load_balancer(&self) -> HarnessResult<LoadBalancer> {
        let mut balancers = self.load_balancing.load_balancers().await?;
        if balancers.len() > 1 {
            return Err(HarnessError::Verification(format!(
                "expected exactly one load balancer, found {}",
                balancers.len()
            )));
        }
        balancers.pop().ok_or_else(|| {
            HarnessError::Verification("expected exactly one load balancer, found none".to_string())
        })
    }

    /// Assert the load balancer matches `expected`: scheme, AZ spread,
    /// listener count, and healthy targets behind the TLS listener's
    /// forward rule.
    pub async fn verify_load_balancer(
        &self,
        expected: &LoadBalancerExpectations,
    ) -> HarnessResult<()> {
        let balancer = self.the_load_balancer().await?;

        let scheme = balancer
            .scheme()
            .map(aws_sdk_elasticloadbalancingv2::types::LoadBalancerSchemeEnum::as_str)
            .unwrap_or_default();
        if scheme != expected.scheme {
            return Err(HarnessError::Verification(format!(
                "unexpected scheme {scheme:?}, wanted {:?}",
                expected.scheme
            )));
        }

        let zone_count = balancer.availability_zones().len();
        if zone_count != expected.availability_zones {
            return Err(HarnessError::Verification(format!(
                "load balancer spans {zone_count} availability zones, wanted {}",
                expected.availability_zones
            )));
        }

        let arn = balancer.load_balancer_arn().unwrap_or_default();
        let listeners = self.load_balancing.listeners(arn).await?;
        if listeners.len() != expected.listeners {
            return Err(HarnessError::Verification(format!(
                "unexpected number of listeners: {}, wanted {}",
                listeners.len(),
                expected.listeners
            )));
        }

        let tls_listener = listeners
            .iter()
            .find(|listener| listener.port() == Some(443))
            .and_then(|listener| listener.listener_arn())
            .ok_or_else(|| {
                HarnessError::Verification("no TLS listener on port 443".to_string())
            })?;

        let target_group = self
            .load_balancing
            .forward_target_group(tls_listener)
            .await?;
        let healthy = self
            .load_balancing
            .healthy_target_count(&target_group)
            .await?;
        if healthy != expected.healthy_targets {
            return Err(HarnessError::Verification(format!(
                "{healthy} healthy targets behind {target_group:?}, wanted {}",
                expected.healthy_targets
            )));
        }

        Ok(())
    }
}
