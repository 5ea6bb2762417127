//! Configuration types for the ipsync system
//!
//! This module defines all configuration structures used throughout the crate.

use crate::traits::resolver::AddressFamily;
use serde::{Deserialize, Serialize};

/// Main sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// The one managed domain (apex records are created under it)
    pub domain: String,

    /// Seconds between reconciliation ticks
    pub interval_secs: u64,

    /// Address families to keep reconciled, in processing order
    #[serde(default = "default_families")]
    pub families: Vec<AddressFamily>,

    /// Zone provider configuration
    pub provider: ProviderConfig,

    /// Public-address resolver configuration
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl SyncConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.is_empty() {
            return Err(crate::Error::config("domain cannot be empty"));
        }
        if self.interval_secs == 0 {
            return Err(crate::Error::config("interval must be > 0 seconds"));
        }
        if self.families.is_empty() {
            return Err(crate::Error::config("at least one address family is required"));
        }

        self.provider.validate()?;
        self.resolver.validate()?;

        Ok(())
    }
}

/// Zone provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// OVH record-management API
    Ovh {
        /// Endpoint alias ("ovh-eu", "ovh-ca", "ovh-us") or a full base URL
        endpoint: String,
        /// Application key
        application_key: String,
        /// Application secret
        application_secret: String,
        /// Consumer key
        consumer_key: String,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Ovh {
                endpoint,
                application_key,
                application_secret,
                consumer_key,
            } => {
                if endpoint.is_empty() {
                    return Err(crate::Error::config("OVH endpoint cannot be empty"));
                }
                if application_key.is_empty()
                    || application_secret.is_empty()
                    || consumer_key.is_empty()
                {
                    return Err(crate::Error::config(
                        "OVH application key, application secret and consumer key are all required",
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Public-address resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolverConfig {
    /// HTTP echo service returning `{"ip": "..."}` per family
    Http {
        /// URL queried for the IPv4 address
        #[serde(default = "default_ipv4_url")]
        ipv4_url: String,
        /// URL queried for the IPv6 address
        #[serde(default = "default_ipv6_url")]
        ipv6_url: String,
    },
}

impl ResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ResolverConfig::Http { ipv4_url, ipv6_url } => {
                if ipv4_url.is_empty() || ipv6_url.is_empty() {
                    return Err(crate::Error::config("resolver URLs cannot be empty"));
                }
                Ok(())
            }
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig::Http {
            ipv4_url: default_ipv4_url(),
            ipv6_url: default_ipv6_url(),
        }
    }
}

fn default_families() -> Vec<AddressFamily> {
    AddressFamily::ALL.to_vec()
}

fn default_ipv4_url() -> String {
    "https://api.ipify.org?format=json".to_string()
}

fn default_ipv6_url() -> String {
    "https://api6.ipify.org?format=json".to_string()
}
