//! CloudWatch client wrapper for the pod's alarm outputs.

use aws_sdk_cloudwatch::Client as CloudWatchClient;

use crate::aws::{AwsError, AwsResult};

pub struct AlarmClient {
    client: CloudWatchClient,
}

impl AlarmClient {
    pub fn new(client: CloudWatchClient) -> Self {
        Self { client }
    }

    /// Names of the metric alarms that actually exist among `names`.
    pub async fn existing_alarms(&self, names: &[String]) -> AwsResult<Vec<String>> {
        let mut request = self.client.describe_alarms();
        for name in names {
            request = request.alarm_names(name);
        }
        let response = request
            .send()
            .await
            .map_err(|e| AwsError::CloudWatchError(format!("Failed to describe alarms: {e}")))?;

        Ok(response
            .metric_alarms()
            .iter()
            .filter_map(|alarm| alarm.alarm_name())
            .map(String::from)
            .collect())
    }
}
