// # OVH Zone Client
//
// This crate provides an OVH implementation of the `ZoneClient` trait.
//
// ## Authentication
//
// Every call (except the clock probe) carries the OVH v1 signature scheme:
//
// ```text
// X-Ovh-Application: <application key>
// X-Ovh-Consumer:    <consumer key>
// X-Ovh-Timestamp:   <unix seconds, drift-corrected>
// X-Ovh-Signature:   "$1$" + hex(sha1(appSecret+"+"+consumerKey+"+"+METHOD
//                                      +"+"+URL+"+"+BODY+"+"+TIMESTAMP))
// ```
//
// Clock drift against the API is measured once via the unsigned
// `GET /auth/time` endpoint and cached for the client's lifetime.
//
// ## Scope
//
// Single-shot API calls only. Retry policy and scheduling are owned by the
// driver; record tracking is owned by the reconciler.
//
// ## Security
//
// The application secret and consumer key never appear in logs, and the
// Debug implementation redacts them.
//
// ## API Reference
//
// - List record ids: GET `/domain/zone/:domain/record?fieldType=A`
// - Fetch record:    GET `/domain/zone/:domain/record/:id`
// - Create record:   POST `/domain/zone/:domain/record`
// - Update record:   PUT `/domain/zone/:domain/record/:id`
// - Refresh zone:    POST `/domain/zone/:domain/refresh`
// - Connectivity:    GET `/me`

use async_trait::async_trait;
use ipsync_core::config::ProviderConfig;
use ipsync_core::traits::{RecordData, RecordId, RecordType, ZoneClient};
use ipsync_core::{Error, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt::Write as _;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Map an endpoint alias to its API base URL
///
/// Full `http(s)://` URLs are passed through untouched, which keeps test
/// servers and self-hosted gateways usable.
fn resolve_endpoint(endpoint: &str) -> Result<String> {
    match endpoint {
        "ovh-eu" => Ok("https://eu.api.ovh.com/1.0".to_string()),
        "ovh-ca" => Ok("https://ca.api.ovh.com/1.0".to_string()),
        "ovh-us" => Ok("https://api.us.ovhcloud.com/1.0".to_string()),
        other if other.starts_with("http://") || other.starts_with("https://") => {
            Ok(other.trim_end_matches('/').to_string())
        }
        other => Err(Error::config(format!("unknown OVH endpoint: {}", other))),
    }
}

/// DNS record in OVH wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireRecord {
    #[serde(rename = "fieldType")]
    field_type: RecordType,
    #[serde(rename = "subDomain", default)]
    sub_domain: String,
    target: String,
    #[serde(default)]
    ttl: u32,
}

impl From<&RecordData> for WireRecord {
    fn from(data: &RecordData) -> Self {
        Self {
            field_type: data.record_type,
            sub_domain: data.subdomain.clone(),
            target: data.target.clone(),
            ttl: data.ttl,
        }
    }
}

impl From<WireRecord> for RecordData {
    fn from(wire: WireRecord) -> Self {
        Self {
            record_type: wire.field_type,
            subdomain: wire.sub_domain,
            target: wire.target,
            ttl: wire.ttl,
        }
    }
}

/// OVH zone client
pub struct OvhZoneClient {
    /// API base URL, resolved from the endpoint alias
    base_url: String,

    /// Application key (public identifier, sent as a header)
    application_key: String,

    /// Application secret, signature input only
    application_secret: String,

    /// Consumer key, signature input and header
    consumer_key: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Cached local-to-server clock delta in seconds
    time_delta: Mutex<Option<i64>>,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for OvhZoneClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OvhZoneClient")
            .field("base_url", &self.base_url)
            .field("application_key", &self.application_key)
            .field("application_secret", &"<REDACTED>")
            .field("consumer_key", &"<REDACTED>")
            .finish()
    }
}

impl OvhZoneClient {
    /// Create a new OVH zone client
    ///
    /// # Parameters
    ///
    /// - `endpoint`: alias ("ovh-eu", "ovh-ca", "ovh-us") or a full base URL
    /// - `application_key` / `application_secret` / `consumer_key`: the three
    ///   OVH credential fields
    pub fn new(
        endpoint: &str,
        application_key: impl Into<String>,
        application_secret: impl Into<String>,
        consumer_key: impl Into<String>,
    ) -> Result<Self> {
        let base_url = resolve_endpoint(endpoint)?;

        let application_key = application_key.into();
        let application_secret = application_secret.into();
        let consumer_key = consumer_key.into();
        if application_key.is_empty() || application_secret.is_empty() || consumer_key.is_empty() {
            return Err(Error::config(
                "OVH application key, application secret and consumer key are all required",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            application_key,
            application_secret,
            consumer_key,
            client,
            time_delta: Mutex::new(None),
        })
    }

    /// Create a client from the core provider configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let ProviderConfig::Ovh {
            endpoint,
            application_key,
            application_secret,
            consumer_key,
        } = config;
        Self::new(endpoint, application_key, application_secret, consumer_key)
    }

    /// Compute the request signature for the given call parameters
    fn sign(&self, method: &str, url: &str, body: &str, timestamp: i64) -> String {
        let input = format!(
            "{}+{}+{}+{}+{}+{}",
            self.application_secret, self.consumer_key, method, url, body, timestamp
        );

        let mut hasher = Sha1::new();
        hasher.update(input.as_bytes());
        let digest = hasher.finalize();

        let mut signature = String::with_capacity(3 + digest.len() * 2);
        signature.push_str("$1$");
        for byte in digest {
            let _ = write!(signature, "{:02x}", byte);
        }
        signature
    }

    /// Drift-corrected unix timestamp for signing
    ///
    /// The delta against the API clock is probed once (unsigned
    /// `GET /auth/time`) and cached. A failed probe falls back to the local
    /// clock; signatures stay valid as long as the drift is small.
    async fn signing_timestamp(&self) -> i64 {
        let local = || {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs() as i64
        };

        if let Some(delta) = *self.time_delta.lock().unwrap() {
            return local() + delta;
        }

        let url = format!("{}/auth/time", self.base_url);
        match self.fetch_server_time(&url).await {
            Ok(server) => {
                let delta = server - local();
                tracing::debug!(delta_secs = delta, "measured OVH clock delta");
                *self.time_delta.lock().unwrap() = Some(delta);
                local() + delta
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to probe OVH server time, using local clock");
                local()
            }
        }
    }

    async fn fetch_server_time(&self, url: &str) -> Result<i64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("time probe failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(Error::http(format!(
                "time probe returned status {}",
                response.status()
            )));
        }
        response
            .json::<i64>()
            .await
            .map_err(|e| Error::http(format!("time probe returned non-numeric body: {}", e)))
    }

    /// Perform one signed API call and map non-success statuses
    async fn call(&self, method: Method, path: &str, body: Option<String>) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let body_text = body.unwrap_or_default();
        let timestamp = self.signing_timestamp().await;
        let signature = self.sign(method.as_str(), &url, &body_text, timestamp);

        let mut request = self
            .client
            .request(method, &url)
            .header("X-Ovh-Application", &self.application_key)
            .header("X-Ovh-Consumer", &self.consumer_key)
            .header("X-Ovh-Timestamp", timestamp.to_string())
            .header("X-Ovh-Signature", signature)
            .header("Content-Type", "application/json");
        if !body_text.is_empty() {
            request = request.body(body_text);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::provider("ovh", format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error response".to_string());

        Err(match status.as_u16() {
            401 | 403 => Error::auth(format!(
                "invalid credentials or insufficient permissions (status {})",
                status
            )),
            404 => Error::not_found(format!("{} (status 404)", path)),
            429 => Error::rate_limited(format!("OVH rate limit exceeded (status {})", status)),
            500..=599 => Error::provider(
                "ovh",
                format!("server error (transient): {} - {}", status, error_text),
            ),
            _ => Error::provider("ovh", format!("call failed: {} - {}", status, error_text)),
        })
    }
}

#[async_trait]
impl ZoneClient for OvhZoneClient {
    async fn list_record_ids(&self, domain: &str, record_type: RecordType) -> Result<Vec<RecordId>> {
        let path = format!("/domain/zone/{}/record?fieldType={}", domain, record_type);
        let response = self.call(Method::GET, &path, None).await?;
        response
            .json::<Vec<RecordId>>()
            .await
            .map_err(|e| Error::provider("ovh", format!("failed to parse id list: {}", e)))
    }

    async fn fetch_record(&self, domain: &str, id: RecordId) -> Result<RecordData> {
        let path = format!("/domain/zone/{}/record/{}", domain, id);
        let response = self.call(Method::GET, &path, None).await?;
        let wire = response
            .json::<WireRecord>()
            .await
            .map_err(|e| Error::provider("ovh", format!("failed to parse record {}: {}", id, e)))?;
        Ok(wire.into())
    }

    async fn create_record(&self, domain: &str, record: &RecordData) -> Result<()> {
        let path = format!("/domain/zone/{}/record", domain);
        let body = serde_json::to_string(&WireRecord::from(record))?;
        self.call(Method::POST, &path, Some(body)).await?;
        Ok(())
    }

    async fn update_record(&self, domain: &str, id: RecordId, record: &RecordData) -> Result<()> {
        let path = format!("/domain/zone/{}/record/{}", domain, id);
        let body = serde_json::to_string(&WireRecord::from(record))?;
        self.call(Method::PUT, &path, Some(body)).await?;
        Ok(())
    }

    async fn refresh_zone(&self, domain: &str) -> Result<()> {
        let path = format!("/domain/zone/{}/refresh", domain);
        self.call(Method::POST, &path, None).await?;
        Ok(())
    }

    async fn check_connectivity(&self) -> Result<()> {
        self.call(Method::GET, "/me", None).await?;
        Ok(())
    }
}
