//! EC2 client wrapper: instance tags, instance profiles, volume and VPC
//! checks.

use std::collections::HashMap;

use aws_sdk_ec2::types::Filter;
use aws_sdk_ec2::Client as Ec2SdkClient;

use crate::aws::{AwsError, AwsResult};

pub struct Ec2Client {
    client: Ec2SdkClient,
}

impl Ec2Client {
    pub fn new(client: Ec2SdkClient) -> Self {
        Self { client }
    }

    pub async fn instance_tags(&self, instance_id: &str) -> AwsResult<HashMap<String, String>> {
        let response = self
            .client
            .describe_tags()
            .filters(
                Filter::builder()
                    .name("resource-id")
                    .values(instance_id)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| {
                AwsError::Ec2Error(format!("Failed to describe tags of {instance_id:?}: {e}"))
            })?;

        Ok(response
            .tags()
            .iter()
            .filter_map(|tag| Some((tag.key()?.to_string(), tag.value()?.to_string())))
            .collect())
    }

    /// IAM instance profile ARN attached to an instance, if any.
    pub async fn instance_profile_arn(&self, instance_id: &str) -> AwsResult<Option<String>> {
        let response = self
            .client
            .describe_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::Ec2Error(format!("Failed to describe instance {instance_id:?}: {e}"))
            })?;

        Ok(response
            .reservations()
            .iter()
            .flat_map(|reservation| reservation.instances())
            .find(|instance| instance.instance_id() == Some(instance_id))
            .and_then(|instance| instance.iam_instance_profile())
            .and_then(|profile| profile.arn())
            .map(String::from))
    }

    /// Number of EBS volumes in the `available` state, i.e. detached and
    /// left behind.
    pub async fn available_volume_count(&self) -> AwsResult<usize> {
        let response = self
            .client
            .describe_volumes()
            .filters(Filter::builder().name("status").values("available").build())
            .send()
            .await
            .map_err(|e| AwsError::Ec2Error(format!("Failed to describe volumes: {e}")))?;
        Ok(response.volumes().len())
    }

    /// Number of VPCs whose primary CIDR matches.
    pub async fn vpc_count_with_cidr(&self, cidr: &str) -> AwsResult<usize> {
        let response = self
            .client
            .describe_vpcs()
            .filters(Filter::builder().name("cidr").values(cidr).build())
            .send()
            .await
            .map_err(|e| AwsError::Ec2Error(format!("Failed to describe VPCs: {e}")))?;
        Ok(response.vpcs().len())
    }
}
