// # Azure DNS Record Sets Client
//
// This crate implements `RecordSetsApi` against the Azure Resource Manager
// DNS REST API.
//
// ## Behaviour
//
// - One HTTP request per call (plus a token request when a fresh token is needed)
// - HTTP status codes mapped to specific errors (401/403, 404, 429, others)
// - HTTP timeout configured (60 seconds)
// - No retry, backoff or record-set caching; callers own those decisions
//
// ## Security Requirements
//
// - Tokens and client secrets NEVER appear in logs or Debug output
// - Credentials come from configuration only
//
// ## API Reference
//
// - Get:    GET    `{endpoint}/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/dnsZones/{zone}/{type}/{name}?api-version=...`
// - Put:    PUT    same URL, record set JSON body, optional `If-Match` / `If-None-Match`
// - Delete: DELETE same URL, optional `If-Match`

pub mod auth;

pub use auth::TokenCredential;

use async_trait::async_trait;
use azdns_core::config::AzureConfig;
use azdns_core::traits::{ApiErrorDetail, DeleteResponse, Lookup, Precondition, RecordSetsApi};
use azdns_core::types::{RecordSet, RecordSetKey};
use azdns_core::{Error, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Default HTTP timeout for API requests (60 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Azure DNS record-set client
///
/// # Security
///
/// The Debug implementation does NOT expose credentials.
pub struct AzureRecordSetsClient {
    subscription_id: String,
    endpoint: String,
    api_version: String,
    credential: TokenCredential,
    client: reqwest::Client,
}

// Custom Debug implementation that hides the credential
impl std::fmt::Debug for AzureRecordSetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureRecordSetsClient")
            .field("subscription_id", &self.subscription_id)
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("credential", &self.credential)
            .finish()
    }
}

/// ARM error envelope: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ArmErrorResponse {
    error: ArmErrorBody,
}

#[derive(Debug, Deserialize)]
struct ArmErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl AzureRecordSetsClient {
    /// Create a client from Azure settings
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the settings are invalid, or `Error::Http`
    /// if the HTTP client cannot be built.
    pub fn new(config: &AzureConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        let credential = TokenCredential::from_config(
            &config.credential,
            &config.authority,
            &config.resource_manager_endpoint,
        );

        tracing::debug!(
            "Azure DNS client for subscription {} at {} ({} credential)",
            config.subscription_id,
            config.resource_manager_endpoint,
            config.credential.type_name()
        );

        Ok(Self {
            subscription_id: config.subscription_id.clone(),
            endpoint: config.resource_manager_endpoint.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            credential,
            client,
        })
    }

    /// URL of a record set, without the query string
    fn record_set_url(&self, key: &RecordSetKey) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/dnsZones/{}/{}/{}",
            self.endpoint,
            self.subscription_id,
            key.resource_group,
            key.zone_name,
            key.record_type,
            key.name
        )
    }

    /// Attach the API version and a bearer token
    async fn prepare(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.credential.token(&self.client).await?;
        Ok(builder
            .query(&[("api-version", self.api_version.as_str())])
            .bearer_auth(token))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        self.prepare(builder)
            .await?
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))
    }
}

/// Parse the ARM error envelope, if the body carries one
fn parse_error_detail(body: &str) -> Option<ApiErrorDetail> {
    let parsed: ArmErrorResponse = serde_json::from_str(body).ok()?;
    Some(ApiErrorDetail {
        code: parsed.error.code,
        message: parsed.error.message,
    })
}

/// Map a non-success response to an error
async fn error_from_response(response: Response, action: &str) -> Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());

    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid credentials or insufficient permissions. Status: {}",
            status
        )),
        429 => Error::rate_limited(format!(
            "Rate limit exceeded. Please retry later. Status: {}",
            status
        )),
        code => match parse_error_detail(&body) {
            Some(detail) => Error::api(code, detail.code, detail.message),
            None => Error::api(code, reason(status), format!("{} failed: {}", action, body)),
        },
    }
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown")
        .replace(' ', "")
}

#[async_trait]
impl RecordSetsApi for AzureRecordSetsClient {
    /// Fetch a record set
    ///
    /// ```http
    /// GET .../dnsZones/:zone/AAAA/:name?api-version=2018-05-01
    /// Authorization: Bearer <token>
    /// ```
    async fn get(&self, key: &RecordSetKey) -> Result<Lookup<RecordSet>> {
        tracing::debug!("Getting record set {}", key);

        let response = self.send(self.client.get(self.record_set_url(key))).await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Record set {} not found", key);
            return Ok(Lookup::NotFound);
        }
        if !response.status().is_success() {
            return Err(error_from_response(response, "Record set lookup").await);
        }

        let record_set: RecordSet = response
            .json()
            .await
            .map_err(|e| Error::http(format!("Failed to parse response: {}", e)))?;
        Ok(Lookup::Found(record_set))
    }

    /// Create or replace a record set
    ///
    /// ```http
    /// PUT .../dnsZones/:zone/AAAA/:name?api-version=2018-05-01
    /// Authorization: Bearer <token>
    /// {"properties": {"TTL": 300, "AAAARecords": [{"ipv6Address": "2001:db8::1"}]}}
    /// ```
    async fn create_or_update(
        &self,
        key: &RecordSetKey,
        parameters: &RecordSet,
        precondition: &Precondition,
    ) -> Result<RecordSet> {
        tracing::debug!("Writing record set {}", key);

        let mut builder = self.client.put(self.record_set_url(key)).json(parameters);
        if let Some(etag) = precondition.if_match.as_deref().filter(|v| !v.is_empty()) {
            builder = builder.header("If-Match", etag);
        }
        if let Some(value) = precondition.if_none_match.as_deref().filter(|v| !v.is_empty()) {
            builder = builder.header("If-None-Match", value);
        }

        let response = self.send(builder).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Record set write").await);
        }

        let record_set: RecordSet = response
            .json()
            .await
            .map_err(|e| Error::http(format!("Failed to parse response: {}", e)))?;
        tracing::info!("Wrote record set {}", key);
        Ok(record_set)
    }

    /// Delete a record set
    ///
    /// Any HTTP answer is returned as a `DeleteResponse`; the body's ARM
    /// error detail is attached for non-success statuses.
    async fn delete(
        &self,
        key: &RecordSetKey,
        precondition: &Precondition,
    ) -> Result<DeleteResponse> {
        tracing::debug!("Deleting record set {}", key);

        let mut builder = self.client.delete(self.record_set_url(key));
        if let Some(etag) = precondition.if_match.as_deref().filter(|v| !v.is_empty()) {
            builder = builder.header("If-Match", etag);
        }

        let response = self.send(builder).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(DeleteResponse {
                status: status.as_u16(),
                detail: None,
            });
        }

        let body = response.text().await.unwrap_or_default();
        let detail = parse_error_detail(&body).or_else(|| {
            (!body.trim().is_empty()).then(|| ApiErrorDetail {
                code: reason(status),
                message: body.clone(),
            })
        });

        Ok(DeleteResponse {
            status: status.as_u16(),
            detail,
        })
    }

    fn api_name(&self) -> &'static str {
        "azure"
    }
}
