//! Cloudflare DNS API client.
//!
//! Only the two calls the updater needs: list a zone's records and patch a
//! single record's content. Authentication uses the legacy key/email header
//! pair (`X-Auth-Key` / `X-Auth-Email`); credentials are not validated
//! locally, a bad pair simply surfaces as a non-2xx response.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com";

/// A DNS record as returned by the provider. Read-only snapshot; fetched
/// fresh each cycle and only ever compared, never mutated locally.
#[derive(Debug, Clone, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub zone_id: String,
    #[serde(default)]
    pub zone_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
    #[serde(default)]
    pub proxiable: bool,
    #[serde(default)]
    pub proxied: bool,
    pub ttl: u32,
    #[serde(default)]
    pub meta: RecordMeta,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_on: String,
    #[serde(default)]
    pub modified_on: String,
    /// Only present on MX records.
    #[serde(default)]
    pub priority: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordMeta {
    #[serde(default)]
    pub auto_added: bool,
    #[serde(default)]
    pub managed_by_apps: bool,
    #[serde(default)]
    pub managed_by_argo_tunnel: bool,
}

/// Pagination metadata on list responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultInfo {
    pub page: u32,
    pub per_page: u32,
    pub count: u32,
    pub total_count: u32,
    pub total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    result: Vec<DnsRecord>,
    success: bool,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
    #[serde(default)]
    messages: Vec<serde_json::Value>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

/// Write payload for the per-record PATCH endpoint. Everything is copied
/// from the existing record except `content`.
#[derive(Debug, Serialize)]
struct RecordUpdate {
    content: String,
    name: String,
    proxied: bool,
    #[serde(rename = "type")]
    record_type: String,
    comment: Option<String>,
    id: String,
    tags: Vec<String>,
    ttl: u32,
}

impl RecordUpdate {
    fn from_record(record: &DnsRecord, new_ip: Ipv4Addr) -> Self {
        Self {
            content: new_ip.to_string(),
            name: record.name.clone(),
            proxied: record.proxied,
            record_type: record.record_type.clone(),
            comment: record.comment.clone(),
            id: record.id.clone(),
            tags: record.tags.clone(),
            ttl: record.ttl,
        }
    }
}

/// Capability surface the reconciler needs from a DNS provider.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// Fetch all DNS records in a zone.
    async fn fetch_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>>;

    /// Point an existing record at a new address, keeping its name, type,
    /// TTL and identifier unchanged.
    async fn update_record(&self, record: &DnsRecord, new_ip: Ipv4Addr) -> Result<()>;
}

/// HTTP client for the Cloudflare v4 API.
pub struct CloudflareClient {
    client: reqwest::Client,
    api_key: String,
    auth_email: String,
    base_url: String,
}

impl CloudflareClient {
    /// Create a new client against the production API.
    pub fn new(api_key: String, auth_email: String) -> Self {
        Self::with_base_url(api_key, auth_email, DEFAULT_BASE_URL.to_string())
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(api_key: String, auth_email: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            auth_email,
            base_url,
        }
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("X-Auth-Key", &self.api_key)
            .header("X-Auth-Email", &self.auth_email)
            .header("Content-Type", "application/json")
    }
}

#[async_trait]
impl DnsApi for CloudflareClient {
    async fn fetch_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let url = format!("{}/client/v4/zones/{}/dns_records", self.base_url, zone_id);

        let response = self.authed(self.client.get(&url)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let decoded: RecordsResponse = serde_json::from_str(&body)?;
        if !decoded.success {
            tracing::warn!(
                "Cloudflare reported errors listing zone {}: {:?}",
                zone_id,
                decoded.errors
            );
        }
        if !decoded.messages.is_empty() {
            tracing::debug!("Cloudflare messages for zone {}: {:?}", zone_id, decoded.messages);
        }
        // Records beyond the first page are not fetched; the default page
        // size (100) covers typical zones.
        if let Some(info) = &decoded.result_info {
            if info.total_pages > 1 {
                tracing::warn!(
                    "zone {} has {} pages of records, only the first was examined",
                    zone_id,
                    info.total_pages
                );
            }
        }
        Ok(decoded.result)
    }

    async fn update_record(&self, record: &DnsRecord, new_ip: Ipv4Addr) -> Result<()> {
        let url = format!(
            "{}/client/v4/zones/{}/dns_records/{}",
            self.base_url, record.zone_id, record.id
        );

        let payload = RecordUpdate::from_record(record, new_ip);
        let response = self
            .authed(self.client.patch(&url))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record_json() -> serde_json::Value {
        serde_json::json!({
            "id": "rec1",
            "zone_id": "zoneA",
            "zone_name": "example.com",
            "name": "home.example.com",
            "type": "A",
            "content": "203.0.113.1",
            "proxiable": true,
            "proxied": false,
            "ttl": 300,
            "meta": {
                "auto_added": false,
                "managed_by_apps": false,
                "managed_by_argo_tunnel": false
            },
            "comment": null,
            "tags": [],
            "created_on": "2023-01-01T00:00:00Z",
            "modified_on": "2023-01-01T00:00:00Z"
        })
    }

    fn sample_record() -> DnsRecord {
        serde_json::from_value(record_json()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_records_success() {
        let mock_server = MockServer::start().await;

        let body = serde_json::json!({
            "result": [record_json()],
            "success": true,
            "errors": [],
            "messages": [],
            "result_info": {
                "page": 1, "per_page": 100, "count": 1,
                "total_count": 1, "total_pages": 1
            }
        });

        Mock::given(method("GET"))
            .and(path("/client/v4/zones/zoneA/dns_records"))
            .and(header("X-Auth-Key", "key-123"))
            .and(header("X-Auth-Email", "admin@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let client = CloudflareClient::with_base_url(
            "key-123".to_string(),
            "admin@example.com".to_string(),
            mock_server.uri(),
        );

        let records = client.fetch_records("zoneA").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "rec1");
        assert_eq!(records[0].record_type, "A");
        assert_eq!(records[0].content, "203.0.113.1");
        assert_eq!(records[0].ttl, 300);
    }

    #[tokio::test]
    async fn test_fetch_records_auth_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/client/v4/zones/zoneA/dns_records"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&mock_server)
            .await;

        let client = CloudflareClient::with_base_url(
            "bad-key".to_string(),
            "admin@example.com".to_string(),
            mock_server.uri(),
        );

        let err = client.fetch_records("zoneA").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_fetch_records_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = CloudflareClient::with_base_url(
            "key".to_string(),
            "admin@example.com".to_string(),
            mock_server.uri(),
        );

        let err = client.fetch_records("zoneA").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_update_record_preserves_identity_fields() {
        let mock_server = MockServer::start().await;

        // The payload must keep the record's name, type, ttl and id and only
        // swap the content.
        Mock::given(method("PATCH"))
            .and(path("/client/v4/zones/zoneA/dns_records/rec1"))
            .and(header("X-Auth-Key", "key-123"))
            .and(header("X-Auth-Email", "admin@example.com"))
            .and(body_partial_json(serde_json::json!({
                "content": "203.0.113.9",
                "name": "home.example.com",
                "type": "A",
                "ttl": 300,
                "id": "rec1",
                "proxied": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": record_json(),
                "success": true,
                "errors": [],
                "messages": []
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = CloudflareClient::with_base_url(
            "key-123".to_string(),
            "admin@example.com".to_string(),
            mock_server.uri(),
        );

        let record = sample_record();
        let new_ip: Ipv4Addr = "203.0.113.9".parse().unwrap();
        client.update_record(&record, new_ip).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_record_rejected_carries_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(400).set_body_string("ttl out of range"))
            .mount(&mock_server)
            .await;

        let client = CloudflareClient::with_base_url(
            "key".to_string(),
            "admin@example.com".to_string(),
            mock_server.uri(),
        );

        let record = sample_record();
        let err = client
            .update_record(&record, "203.0.113.9".parse().unwrap())
            .await
            .unwrap_err();

        match err {
            Error::Api { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "ttl out of range");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
