//! Route 53 client wrapper: hosted zones and record sets.

use aws_sdk_route53::types::RrType;
use aws_sdk_route53::Client as Route53Client;

use crate::aws::{AwsError, AwsResult};

pub struct DnsClient {
    client: Route53Client,
}

impl DnsClient {
    pub fn new(client: Route53Client) -> Self {
        Self { client }
    }

    /// Id of the hosted zone serving `zone_name`. The zone must be hosted
    /// in the target account.
    pub async fn hosted_zone_id(&self, zone_name: &str) -> AwsResult<String> {
        let response = self
            .client
            .list_hosted_zones_by_name()
            .dns_name(zone_name)
            .send()
            .await
            .map_err(|e| {
                AwsError::Route53Error(format!("Failed to list hosted zones for {zone_name:?}: {e}"))
            })?;

        response
            .hosted_zones()
            .first()
            .map(|zone| zone.id().to_string())
            .ok_or_else(|| {
                AwsError::Route53Error(format!("zone {zone_name:?} is not hosted by AWS"))
            })
    }

    /// Fully-qualified names of all A and CNAME records in a zone.
    pub async fn address_record_names(&self, hosted_zone_id: &str) -> AwsResult<Vec<String>> {
        let response = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(hosted_zone_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::Route53Error(format!(
                    "Failed to list record sets in {hosted_zone_id:?}: {e}"
                ))
            })?;

        Ok(response
            .resource_record_sets()
            .iter()
            .filter(|record| matches!(record.r#type(), RrType::A | RrType::Cname))
            .map(|record| record.name().to_string())
            .collect())
    }
}
