//! HTTPS probe against the served records.

use log::debug;

use crate::error::HarnessResult;

/// Status and body of a probe response.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: String,
}

impl ProbeResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// GET `https://<host>/`. With `accept_invalid_certs` the certificate is
/// not validated, which is how the load balancer's raw DNS name is probed
/// (its certificate only covers the zone's records).
pub async fn fetch(host: &str, accept_invalid_certs: bool) -> HarnessResult<ProbeResponse> {
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()?;

    let url = format!("https://{host}");
    debug!("Probing {url} (accept_invalid_certs={accept_invalid_certs})");
    let response = client.get(&url).send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok(ProbeResponse { status, body })
}
