//! Public IP resolution.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Endpoint returning the caller's public IP as plain text.
pub const DEFAULT_IP_ENDPOINT: &str = "https://checkip.amazonaws.com/";

/// Source of the caller's current public IPv4 address.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the current public address.
    async fn resolve(&self) -> Result<Ipv4Addr>;
}

/// IP resolver backed by a plain-text "what is my IP" HTTP endpoint.
pub struct HttpIpResolver {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpIpResolver {
    /// Create a resolver against the default echo endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_IP_ENDPOINT.to_string())
    }

    /// Create a resolver against a custom endpoint (also used for testing).
    pub fn with_endpoint(endpoint: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, endpoint }
    }
}

#[async_trait]
impl IpSource for HttpIpResolver {
    /// One GET, no retries. The next scheduled cycle is the retry.
    async fn resolve(&self) -> Result<Ipv4Addr> {
        let response = self.client.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(Error::IpResolve(format!(
                "HTTP {} from {}",
                response.status(),
                self.endpoint
            )));
        }

        let text = response.text().await?;
        let ip_str = text.trim();

        let ip = ip_str
            .parse()
            .map_err(|_| Error::IpResolve(format!("Invalid IP response: {ip_str}")))?;
        tracing::debug!("Resolved public IP {} from {}", ip, self.endpoint);
        Ok(ip)
    }
}

impl Default for HttpIpResolver {
    fn default() -> Self {
        Self::new()
    }
}
