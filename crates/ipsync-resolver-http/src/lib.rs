// # HTTP Address Resolver
//
// This crate resolves the host's public address by querying an ipify-style
// echo service (`{"ip": "..."}`) over HTTPS, one URL per address family.
//
// ## Failure taxonomy
//
// Three failure causes are constructed as distinct errors so logs can tell
// them apart, even though the driver treats them all the same way:
// - transport failure (request never completed)
// - non-success HTTP status
// - malformed or missing address in the response body
//
// The returned address is the service's text verbatim; it is only checked to
// parse as an IP of the requested family.

use async_trait::async_trait;
use ipsync_core::config::ResolverConfig;
use ipsync_core::traits::{AddressFamily, AddressResolver, PublicAddress};
use ipsync_core::{Error, Result};
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

/// Default per-request timeout
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Echo-service response body
#[derive(Debug, Deserialize)]
struct EchoResponse {
    ip: Option<String>,
}

/// Validate an echo-service body and extract the address text
fn extract_address(body: &str, family: AddressFamily) -> Result<PublicAddress> {
    let parsed: EchoResponse = serde_json::from_str(body)
        .map_err(|e| Error::resolver(format!("malformed response body: {}", e)))?;

    let ip_text = match parsed.ip {
        Some(ip) if !ip.is_empty() => ip,
        _ => return Err(Error::resolver("public IP not found in response")),
    };

    let ip: IpAddr = ip_text
        .parse()
        .map_err(|_| Error::resolver(format!("response is not an IP address: {}", ip_text)))?;

    let family_matches = match family {
        AddressFamily::V4 => ip.is_ipv4(),
        AddressFamily::V6 => ip.is_ipv6(),
    };
    if !family_matches {
        return Err(Error::resolver(format!(
            "expected an {} address, got: {}",
            family, ip_text
        )));
    }

    Ok(PublicAddress::new(ip_text))
}

/// HTTP-based public-address resolver
pub struct HttpAddressResolver {
    /// URL queried for the IPv4 address
    ipv4_url: String,

    /// URL queried for the IPv6 address
    ipv6_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpAddressResolver {
    /// Create a resolver with explicit per-family URLs
    pub fn new(ipv4_url: impl Into<String>, ipv6_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            ipv4_url: ipv4_url.into(),
            ipv6_url: ipv6_url.into(),
            client,
        })
    }

    /// Create a resolver from the core resolver configuration
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let ResolverConfig::Http { ipv4_url, ipv6_url } = config;
        Self::new(ipv4_url, ipv6_url)
    }

    fn url_for(&self, family: AddressFamily) -> &str {
        match family {
            AddressFamily::V4 => &self.ipv4_url,
            AddressFamily::V6 => &self.ipv6_url,
        }
    }
}

#[async_trait]
impl AddressResolver for HttpAddressResolver {
    async fn resolve(&self, family: AddressFamily) -> Result<PublicAddress> {
        let url = self.url_for(family);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::resolver(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::resolver(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::resolver(format!("failed to read response from {}: {}", url, e)))?;

        let address = extract_address(&body, family)?;
        tracing::debug!(%family, address = %address, "resolved public address");
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_ipv4_address() {
        let addr = extract_address(r#"{"ip":"203.0.113.7"}"#, AddressFamily::V4).unwrap();
        assert_eq!(addr.as_str(), "203.0.113.7");
    }

    #[test]
    fn extracts_ipv6_address_verbatim() {
        // The service's spelling is preserved, not normalized.
        let addr = extract_address(r#"{"ip":"2001:0db8::1"}"#, AddressFamily::V6).unwrap();
        assert_eq!(addr.as_str(), "2001:0db8::1");
    }

    #[test]
    fn rejects_wrong_family() {
        assert!(extract_address(r#"{"ip":"203.0.113.7"}"#, AddressFamily::V6).is_err());
        assert!(extract_address(r#"{"ip":"2001:db8::1"}"#, AddressFamily::V4).is_err());
    }

    #[test]
    fn rejects_missing_or_empty_ip() {
        assert!(extract_address(r#"{}"#, AddressFamily::V4).is_err());
        assert!(extract_address(r#"{"ip":""}"#, AddressFamily::V4).is_err());
    }

    #[test]
    fn rejects_non_json_body() {
        assert!(extract_address("<html>busy</html>", AddressFamily::V4).is_err());
    }

    #[test]
    fn rejects_non_address_payload() {
        assert!(extract_address(r#"{"ip":"not-an-ip"}"#, AddressFamily::V4).is_err());
    }

    #[test]
    fn from_config_uses_per_family_urls() {
        let resolver = HttpAddressResolver::from_config(&ResolverConfig::default()).unwrap();
        assert!(resolver.url_for(AddressFamily::V4).contains("api.ipify.org"));
        assert!(resolver.url_for(AddressFamily::V6).contains("api6.ipify.org"));
    }
}
