//! ELBv2 client wrapper: load balancers, listeners, rules, target health.

use aws_sdk_elasticloadbalancingv2::types::{
    ActionTypeEnum, Listener, LoadBalancer, Rule, TargetHealthStateEnum,
};
use aws_sdk_elasticloadbalancingv2::Client as ElasticLoadBalancingClient;

use crate::aws::{AwsError, AwsResult};

pub struct ElbClient {
    client: ElasticLoadBalancingClient,
}

impl ElbClient {
    pub fn new(client: ElasticLoadBalancingClient) -> Self {
        Self { client }
    }

    pub async fn load_balancers(&self) -> AwsResult<Vec<LoadBalancer>> {
        let response = self
            .client
            .describe_load_balancers()
            .send()
            .await
            .map_err(|e| AwsError::ElbError(format!("Failed to describe load balancers: {e}")))?;
        Ok(response.load_balancers().to_vec())
    }

    pub async fn listeners(&self, load_balancer_arn: &str) -> AwsResult<Vec<Listener>> {
        let response = self
            .client
            .describe_listeners()
            .load_balancer_arn(load_balancer_arn)
            .send()
            .await
            .map_err(|e| {
                AwsError::ElbError(format!(
                    "Failed to describe listeners of {load_balancer_arn:?}: {e}"
                ))
            })?;
        Ok(response.listeners().to_vec())
    }

    pub async fn rules(&self, listener_arn: &str) -> AwsResult<Vec<Rule>> {
        let response = self
            .client
            .describe_rules()
            .listener_arn(listener_arn)
            .send()
            .await
            .map_err(|e| {
                AwsError::ElbError(format!("Failed to describe rules of {listener_arn:?}: {e}"))
            })?;
        Ok(response.rules().to_vec())
    }

    /// Target group ARN of the first forward rule on a listener.
    pub async fn forward_target_group(&self, listener_arn: &str) -> AwsResult<String> {
        let rules = self.rules(listener_arn).await?;
        rules
            .iter()
            .flat_map(Rule::actions)
            .find(|action| matches!(action.r#type(), ActionTypeEnum::Forward))
            .and_then(|action| action.target_group_arn())
            .map(String::from)
            .ok_or_else(|| {
                AwsError::ElbError(format!("no forward rule found on listener {listener_arn:?}"))
            })
    }

    pub async fn healthy_target_count(&self, target_group_arn: &str) -> AwsResult<usize> {
        let response = self
            .client
            .describe_target_health()
            .target_group_arn(target_group_arn)
            .send()
            .await
            .map_err(|e| {
                AwsError::ElbError(format!(
                    "Failed to describe target health of {target_group_arn:?}: {e}"
                ))
            })?;

        Ok(response
            .target_health_descriptions()
            .iter()
            .filter(|description| {
                description
                    .target_health()
                    .and_then(|health| health.state())
                    .is_some_and(|state| matches!(state, TargetHealthStateEnum::Healthy))
            })
            .count())
    }
}
