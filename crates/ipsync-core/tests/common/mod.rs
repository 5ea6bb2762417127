//! Test doubles and common utilities for contract tests
//!
//! The mock zone client keeps a provider-side record table, logs every call,
//! and can be told to fail specific operations. It also detects overlapping
//! invocations, which the serialization contract test relies on.

use ipsync_core::error::Result;
use ipsync_core::traits::{
    AddressFamily, AddressResolver, PublicAddress, RecordData, RecordId, RecordType, ZoneClient,
};
use ipsync_core::Error;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

/// One observed zone client call
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum Call {
    List(RecordType),
    Fetch(RecordId),
    Create(RecordData),
    Update(RecordId, RecordData),
    Refresh,
    Connectivity,
}

/// A scriptable ZoneClient double
pub struct MockZoneClient {
    records: Mutex<BTreeMap<RecordId, RecordData>>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,

    fail_listing: AtomicBool,
    fail_create: AtomicBool,
    fail_refresh: AtomicBool,
    fail_fetch_ids: Mutex<HashSet<RecordId>>,
    fail_update_ids: Mutex<HashSet<RecordId>>,

    in_flight: AtomicBool,
    overlap_detected: AtomicBool,
}

#[allow(dead_code)]
impl MockZoneClient {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1000),
            fail_listing: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            fail_refresh: AtomicBool::new(false),
            fail_fetch_ids: Mutex::new(HashSet::new()),
            fail_update_ids: Mutex::new(HashSet::new()),
            in_flight: AtomicBool::new(false),
            overlap_detected: AtomicBool::new(false),
        }
    }

    /// Pre-populate one provider-side record
    pub fn seed_record(&self, id: RecordId, data: RecordData) {
        self.records.lock().unwrap().insert(id, data);
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_refresh(&self, fail: bool) {
        self.fail_refresh.store(fail, Ordering::SeqCst);
    }

    pub fn fail_fetch_of(&self, id: RecordId) {
        self.fail_fetch_ids.lock().unwrap().insert(id);
    }

    pub fn fail_update_of(&self, id: RecordId) {
        self.fail_update_ids.lock().unwrap().insert(id);
    }

    /// Full ordered call log
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_call_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Create(_)))
    }

    pub fn update_call_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Update(_, _)))
    }

    pub fn refresh_call_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Refresh))
    }

    pub fn mutation_call_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Create(_) | Call::Update(_, _) | Call::Refresh))
    }

    /// Whether two calls ever executed with overlapping lifetimes
    pub fn overlap_detected(&self) -> bool {
        self.overlap_detected.load(Ordering::SeqCst)
    }

    /// Current provider-side view of a record
    pub fn stored_record(&self, id: RecordId) -> Option<RecordData> {
        self.records.lock().unwrap().get(&id).cloned()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn enter(&self, call: Call) {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlap_detected.store(true, Ordering::SeqCst);
        }
        self.calls.lock().unwrap().push(call);
    }

    fn exit(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }

    /// Widen the overlap-detection window across an await point
    async fn simulate_latency(&self) {
        tokio::time::sleep(tokio::time::Duration::from_millis(2)).await;
    }
}

#[async_trait::async_trait]
impl ZoneClient for MockZoneClient {
    async fn list_record_ids(
        &self,
        _domain: &str,
        record_type: RecordType,
    ) -> Result<Vec<RecordId>> {
        self.enter(Call::List(record_type));
        self.simulate_latency().await;
        let result = if self.fail_listing.load(Ordering::SeqCst) {
            Err(Error::zone_client("listing failed (injected)"))
        } else {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, data)| data.record_type == record_type)
                .map(|(id, _)| *id)
                .collect())
        };
        self.exit();
        result
    }

    async fn fetch_record(&self, _domain: &str, id: RecordId) -> Result<RecordData> {
        self.enter(Call::Fetch(id));
        self.simulate_latency().await;
        let result = if self.fail_fetch_ids.lock().unwrap().contains(&id) {
            Err(Error::zone_client(format!("fetch of {} failed (injected)", id)))
        } else {
            self.records
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("record {}", id)))
        };
        self.exit();
        result
    }

    async fn create_record(&self, _domain: &str, record: &RecordData) -> Result<()> {
        self.enter(Call::Create(record.clone()));
        self.simulate_latency().await;
        let result = if self.fail_create.load(Ordering::SeqCst) {
            Err(Error::zone_client("create failed (injected)"))
        } else {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.records.lock().unwrap().insert(id, record.clone());
            Ok(())
        };
        self.exit();
        result
    }

    async fn update_record(&self, _domain: &str, id: RecordId, record: &RecordData) -> Result<()> {
        self.enter(Call::Update(id, record.clone()));
        self.simulate_latency().await;
        let result = if self.fail_update_ids.lock().unwrap().contains(&id) {
            Err(Error::zone_client(format!("update of {} failed (injected)", id)))
        } else {
            self.records.lock().unwrap().insert(id, record.clone());
            Ok(())
        };
        self.exit();
        result
    }

    async fn refresh_zone(&self, _domain: &str) -> Result<()> {
        self.enter(Call::Refresh);
        self.simulate_latency().await;
        let result = if self.fail_refresh.load(Ordering::SeqCst) {
            Err(Error::zone_client("refresh failed (injected)"))
        } else {
            Ok(())
        };
        self.exit();
        result
    }

    async fn check_connectivity(&self) -> Result<()> {
        self.enter(Call::Connectivity);
        self.exit();
        Ok(())
    }
}

/// A scriptable AddressResolver double
///
/// Families with no configured address fail resolution.
pub struct MockResolver {
    addresses: Mutex<HashMap<AddressFamily, String>>,
}

#[allow(dead_code)]
impl MockResolver {
    pub fn new() -> Self {
        Self {
            addresses: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_address(&self, family: AddressFamily, addr: impl Into<String>) {
        self.addresses.lock().unwrap().insert(family, addr.into());
    }

    pub fn clear_address(&self, family: AddressFamily) {
        self.addresses.lock().unwrap().remove(&family);
    }
}

#[async_trait::async_trait]
impl AddressResolver for MockResolver {
    async fn resolve(&self, family: AddressFamily) -> Result<PublicAddress> {
        match self.addresses.lock().unwrap().get(&family) {
            Some(addr) => Ok(PublicAddress::new(addr.clone())),
            None => Err(Error::resolver(format!("no {} address (injected)", family))),
        }
    }
}

/// A ManagedRecord-shaped fixture helper
#[allow(dead_code)]
pub fn managed(
    id: RecordId,
    record_type: RecordType,
    subdomain: &str,
    target: &str,
    ttl: u32,
) -> ipsync_core::ManagedRecord {
    ipsync_core::ManagedRecord {
        id,
        record_type,
        subdomain: subdomain.to_string(),
        target: target.to_string(),
        ttl,
    }
}
