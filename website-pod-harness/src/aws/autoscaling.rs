//! Auto Scaling client wrapper: instance refresh statuses and group
//! membership.

use async_trait::async_trait;
use aws_sdk_autoscaling::types::{AutoScalingGroup, LifecycleState};
use aws_sdk_autoscaling::Client as AutoScalingClient;

use crate::aws::{AwsError, AwsResult};
use crate::refresh::{RefreshStatus, RefreshStatusSource};

pub struct AsgClient {
    client: AutoScalingClient,
}

impl AsgClient {
    pub fn new(client: AutoScalingClient) -> Self {
        Self { client }
    }

    /// Current refresh statuses for a group, freshly fetched.
    pub async fn instance_refresh_statuses(&self, group_name: &str) -> AwsResult<Vec<RefreshStatus>> {
        let response = self
            .client
            .describe_instance_refreshes()
            .auto_scaling_group_name(group_name)
            .send()
            .await
            .map_err(|e| {
                AwsError::AutoScalingError(format!(
                    "Failed to describe instance refreshes for {group_name:?}: {e}"
                ))
            })?;

        response
            .instance_refreshes()
            .iter()
            .filter_map(|refresh| refresh.status())
            .map(|status| status.as_str().parse())
            .collect()
    }

    /// Describe a single group. An unknown name is an error rather than a
    /// silent empty result.
    pub async fn describe_group(&self, group_name: &str) -> AwsResult<AutoScalingGroup> {
        let response = self
            .client
            .describe_auto_scaling_groups()
            .auto_scaling_group_names(group_name)
            .send()
            .await
            .map_err(|e| {
                AwsError::AutoScalingError(format!(
                    "Failed to describe auto-scaling group {group_name:?}: {e}"
                ))
            })?;

        response
            .auto_scaling_groups()
            .first()
            .cloned()
            .ok_or_else(|| {
                AwsError::AutoScalingError(format!("auto-scaling group {group_name:?} not found"))
            })
    }

    /// Instance ids of members currently in the `InService` lifecycle state.
    pub async fn in_service_instances(&self, group_name: &str) -> AwsResult<Vec<String>> {
        let group = self.describe_group(group_name).await?;
        Ok(group
            .instances()
            .iter()
            .filter(|instance| matches!(instance.lifecycle_state(), LifecycleState::InService))
            .map(|instance| instance.instance_id().to_string())
            .collect())
    }
}

#[async_trait]
impl RefreshStatusSource for AsgClient {
    async fn describe_refreshes(&self, group_name: &str) -> AwsResult<Vec<RefreshStatus>> {
        self.instance_refresh_statuses(group_name).await
    }
}
