// # Reconciliation State
//
// In-memory tracking of the records believed to hold the correct address,
// per family. The state lives for the process lifetime only: it starts
// empty and is never persisted, so a restarted process falls back to fresh
// discovery on its first pass.

use crate::traits::resolver::{AddressFamily, PublicAddress};
use crate::traits::zone_client::{RecordData, RecordId, RecordType};
use std::collections::HashMap;

/// One DNS record the system has previously created or adopted for a family
///
/// The `id` is immutable once learned from the provider; every other field is
/// a cached copy of what was last observed or written and may go stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedRecord {
    /// Provider-assigned identifier, used to address updates
    pub id: RecordId,
    /// Record type, always consistent with the family tracking it
    pub record_type: RecordType,
    /// Host label under the managed domain; empty means the apex
    pub subdomain: String,
    /// Last-known address value written to the provider
    pub target: String,
    /// Time-to-live as last observed or written
    pub ttl: u32,
}

impl ManagedRecord {
    /// Adopt a fetched record under its provider id
    pub fn from_parts(id: RecordId, data: RecordData) -> Self {
        Self {
            id,
            record_type: data.record_type,
            subdomain: data.subdomain,
            target: data.target,
            ttl: data.ttl,
        }
    }

    /// Build the update payload pointing this record at a new address
    ///
    /// Preserves subdomain, record type and ttl; only the target changes.
    pub fn retarget(&self, address: &PublicAddress) -> RecordData {
        RecordData {
            record_type: self.record_type,
            subdomain: self.subdomain.clone(),
            target: address.as_str().to_string(),
            ttl: self.ttl,
        }
    }
}

/// Per-family sets of records currently believed correct
///
/// Owned exclusively by the driver; the reconciler receives each family's set
/// by value and hands the replacement back. Single writer, no aliasing.
#[derive(Debug, Default)]
pub struct ReconciliationState {
    records: HashMap<AddressFamily, Vec<ManagedRecord>>,
}

impl ReconciliationState {
    /// Create empty state for all families
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the known-correct records for one family
    pub fn records(&self, family: AddressFamily) -> Vec<ManagedRecord> {
        self.records.get(&family).cloned().unwrap_or_default()
    }

    /// Replace one family's record set after a successful pass
    pub fn replace(&mut self, family: AddressFamily, records: Vec<ManagedRecord>) {
        self.records.insert(family, records);
    }
}
