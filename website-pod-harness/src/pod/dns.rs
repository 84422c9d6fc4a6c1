//! DNS record verification for the pod's zone.

use crate::error::{HarnessError, HarnessResult};

impl super::service::WebsitePod {
    /// Fully-qualified name a record label resolves to within a zone. An
    /// empty label means the zone apex.
    pub fn qualified_record(zone_name: &str, label: &str) -> String {
        if label.is_empty() {
            format!("{zone_name}.")
        } else {
            format!("{label}.{zone_name}.")
        }
    }

    /// Assert the zone is hosted and every expected record label has an A
    /// or CNAME record. The apex record is always expected.
    pub async fn verify_dns_records(&self, zone_name: &str, labels: &[String]) -> HarnessResult<()> {
        let zone_id = self.dns.hosted_zone_id(zone_name).await?;
        let records = self.dns.address_record_names(&zone_id).await?;

        let mut expected = vec![Self::qualified_record(zone_name, "")];
        expected.extend(labels.iter().map(|label| Self::qualified_record(zone_name, label)));

        for name in expected {
            if !records.contains(&name) {
                return Err(HarnessError::Verification(format!(
                    "record {name:?} is missing in zone {zone_name:?}: {records:?}"
                )));
            }
        }
        Ok(())
    }
}
