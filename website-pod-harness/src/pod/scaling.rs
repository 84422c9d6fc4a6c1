//! Auto-scaling verification: convergence, membership, tags, instance
//! profiles.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{HarnessError, HarnessResult};
use crate::refresh::{wait_for_instance_refresh, DEFAULT_POLL_INTERVAL};

impl super::service::WebsitePod {
    /// Wait until no instance refresh against the group is in flight,
    /// polling at the default interval. Unbounded; the caller owns the
    /// deadline.
    pub async fn wait_until_stable(&self, group_name: &str) -> HarnessResult<()> {
        self.wait_until_stable_with_interval(group_name, DEFAULT_POLL_INTERVAL)
            .await
    }

    pub async fn wait_until_stable_with_interval(
        &self,
        group_name: &str,
        poll_interval: Duration,
    ) -> HarnessResult<()> {
        wait_for_instance_refresh(&self.scaling, group_name, poll_interval).await?;
        Ok(())
    }

    /// Assert the group has exactly `expected` InService instances and
    /// return their ids.
    pub async fn verify_in_service_count(
        &self,
        group_name: &str,
        expected: usize,
    ) -> HarnessResult<Vec<String>> {
        let instances = self.scaling.in_service_instances(group_name).await?;
        if instances.len() != expected {
            return Err(HarnessError::Verification(format!(
                "{} InService instances in {group_name:?}, wanted {expected}",
                instances.len()
            )));
        }
        Ok(instances)
    }

    /// Tags of the first InService instance in the group. At least one
    /// healthy instance must exist.
    pub async fn healthy_instance_tags(
        &self,
        group_name: &str,
    ) -> HarnessResult<HashMap<String, String>> {
        let instance_id = self
            .scaling
            .in_service_instances(group_name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                HarnessError::Verification(format!(
                    "could not find a healthy instance in ASG {group_name:?}"
                ))
            })?;
        Ok(self.compute.instance_tags(&instance_id).await?)
    }

    /// Assert every instance in the group carries the given instance
    /// profile ARN.
    pub async fn verify_instance_profile(
        &self,
        group_name: &str,
        expected_arn: &str,
    ) -> HarnessResult<()> {
        let group = self.scaling.describe_group(group_name).await?;
        for instance in group.instances() {
            let instance_id = instance.instance_id();
            let arn = self.compute.instance_profile_arn(instance_id).await?;
            if arn.as_deref() != Some(expected_arn) {
                return Err(HarnessError::Verification(format!(
                    "instance {instance_id} has profile {arn:?}, wanted {expected_arn:?}"
                )));
            }
        }
        Ok(())
    }

    /// Assert the named alarms exist in CloudWatch.
    pub async fn verify_alarms(&self, alarm_names: &[String]) -> HarnessResult<()> {
        let existing = self.alarms.existing_alarms(alarm_names).await?;
        if let Some(name) = first_missing_alarm(alarm_names, &existing) {
            return Err(HarnessError::Verification(format!(
                "alarm {name:?} does not exist: {existing:?}"
            )));
        }
        Ok(())
    }

    /// Assert no EBS volume was left behind after teardown.
    pub async fn verify_no_leaked_volumes(&self) -> HarnessResult<()> {
        let count = self.compute.available_volume_count().await?;
        if count != 0 {
            return Err(HarnessError::Verification(format!(
                "{count} unattached EBS volume(s) left behind"
            )));
        }
        Ok(())
    }
}

/// First expected alarm name absent from the describe response, if any.
fn first_missing_alarm<'a>(expected: &'a [String], existing: &[String]) -> Option<&'a str> {
    expected
        .iter()
        .find(|name| !existing.contains(name))
        .map(String::as_str)
}
