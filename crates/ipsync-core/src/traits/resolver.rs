// # Address Resolver Trait
//
// Defines the interface for discovering the host's current public address.
//
// ## Implementations
//
// - HTTP echo service (ipify-style): `ipsync-resolver-http` crate
// - Future: router/UPnP query, interface inspection
//
// ## Usage
//
// ```rust,ignore
// use ipsync_core::{AddressFamily, AddressResolver};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* AddressResolver implementation */;
//
//     let addr = resolver.resolve(AddressFamily::V4).await?;
//     println!("public IPv4: {}", addr);
//
//     Ok(())
// }
// ```

use crate::traits::zone_client::RecordType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Address family tracked by the reconciliation loop
///
/// Each family maps to exactly one DNS record type and is reconciled
/// independently of the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// IPv4 ("A" records)
    V4,
    /// IPv6 ("AAAA" records)
    V6,
}

impl AddressFamily {
    /// All tracked families, in the fixed order the driver processes them
    pub const ALL: [AddressFamily; 2] = [AddressFamily::V4, AddressFamily::V6];

    /// The DNS record type published for this family
    pub fn record_type(&self) -> RecordType {
        match self {
            AddressFamily::V4 => RecordType::A,
            AddressFamily::V6 => RecordType::Aaaa,
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressFamily::V4 => write!(f, "IPv4"),
            AddressFamily::V6 => write!(f, "IPv6"),
        }
    }
}

/// Textual public address as reported by a resolver
///
/// The core compares addresses for equality only. Whatever text the resolver
/// hands over is written to the provider verbatim; the resolver is responsible
/// for rejecting payloads that are not an address of the requested family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicAddress(String);

impl PublicAddress {
    /// Wrap a resolver-provided address string
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// The address text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PublicAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PublicAddress {
    fn from(addr: String) -> Self {
        Self(addr)
    }
}

/// Trait for public-address resolver implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Failure taxonomy
///
/// Implementations should construct distinct errors for transport failures,
/// non-success HTTP statuses, and malformed/missing addresses so that logs can
/// tell them apart. The driver treats all of them as a single "resolution
/// failed" outcome: log, skip the family for this tick, retry next tick.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve the host's current public address for one family
    ///
    /// # Returns
    ///
    /// - `Ok(PublicAddress)`: the current address as text
    /// - `Err(Error)`: resolution failed for this family
    async fn resolve(&self, family: AddressFamily) -> Result<PublicAddress, crate::Error>;
}
