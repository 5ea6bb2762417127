// # Zone Client Trait
//
// Defines the interface for record CRUD against a DNS provider's
// record-management API.
//
// ## Implementations
//
// - OVH: `ipsync-provider-ovh` crate
// - Future: Gandi, Cloudflare, Route53, etc.
//
// ## Usage
//
// ```rust,ignore
// use ipsync_core::{RecordData, RecordType, ZoneClient};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let client = /* ZoneClient implementation */;
//
//     let ids = client.list_record_ids("example.com", RecordType::A).await?;
//     for id in ids {
//         let record = client.fetch_record("example.com", id).await?;
//         println!("{}: {}", id, record.target);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider-assigned record identifier
///
/// Opaque to the core; only used to address update requests.
pub type RecordId = i64;

/// DNS record type managed by the reconciliation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of one DNS record, as created or updated at the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordData {
    /// Record type ("A" or "AAAA")
    pub record_type: RecordType,
    /// Host label under the managed domain; empty means the apex
    pub subdomain: String,
    /// Address value the record points at
    pub target: String,
    /// Time-to-live in seconds; 0 means the provider default
    pub ttl: u32,
}

impl RecordData {
    /// Build an apex record for a freshly discovered address
    ///
    /// Uses ttl 0 so the provider applies its default.
    pub fn apex(record_type: RecordType, target: impl Into<String>) -> Self {
        Self {
            record_type,
            subdomain: String::new(),
            target: target.into(),
            ttl: 0,
        }
    }
}

/// Trait for DNS provider zone clients
///
/// This trait covers exactly the operations the reconciliation loop needs.
/// Implementations own authentication, transport, and request signing.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Scope
///
/// Zone clients perform single-shot API calls and nothing else. Retry policy
/// and scheduling are owned by the driver; state tracking is owned by the
/// reconciler. A failed call returns an error and the caller decides what
/// that failure means for the pass.
#[async_trait]
pub trait ZoneClient: Send + Sync {
    /// List the ids of all records of one type in the managed domain
    async fn list_record_ids(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<Vec<RecordId>, crate::Error>;

    /// Fetch the full payload of one record by id
    async fn fetch_record(&self, domain: &str, id: RecordId) -> Result<RecordData, crate::Error>;

    /// Create a new record in the managed domain
    async fn create_record(&self, domain: &str, record: &RecordData) -> Result<(), crate::Error>;

    /// Overwrite an existing record, addressed by id
    async fn update_record(
        &self,
        domain: &str,
        id: RecordId,
        record: &RecordData,
    ) -> Result<(), crate::Error>;

    /// Publish pending record changes for the domain
    async fn refresh_zone(&self, domain: &str) -> Result<(), crate::Error>;

    /// Probe the provider API once, to fail fast on bad credentials
    async fn check_connectivity(&self) -> Result<(), crate::Error>;
}
