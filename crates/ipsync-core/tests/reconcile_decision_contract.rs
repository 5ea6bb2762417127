//! Contract tests: reconciler decision branches
//!
//! Verifies the three decision paths of a reconciliation pass:
//! - Steady state performs zero writes
//! - First-ever mismatch creates exactly one apex record
//! - Address change updates every previously-known record
//!
//! If these fail, the core decision logic is broken.

mod common;

use common::*;
use ipsync_core::traits::{AddressFamily, PublicAddress, RecordData, RecordType};
use ipsync_core::Reconciler;
use std::sync::Arc;

#[tokio::test]
async fn matching_record_means_zero_writes() {
    let client = Arc::new(MockZoneClient::new());
    client.seed_record(
        10,
        RecordData {
            record_type: RecordType::A,
            subdomain: String::new(),
            target: "203.0.113.7".to_string(),
            ttl: 0,
        },
    );
    // A record of the other type must not influence the A pass.
    client.seed_record(
        20,
        RecordData {
            record_type: RecordType::Aaaa,
            subdomain: String::new(),
            target: "2001:db8::1".to_string(),
            ttl: 0,
        },
    );

    let reconciler = Reconciler::new(client.clone(), "example.com");
    let result = reconciler
        .reconcile(
            Vec::new(),
            AddressFamily::V4,
            &PublicAddress::new("203.0.113.7"),
        )
        .await
        .expect("pass succeeds");

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, 10);
    assert_eq!(result[0].target, "203.0.113.7");
    assert_eq!(
        client.mutation_call_count(),
        0,
        "steady state must not create, update or refresh"
    );
}

#[tokio::test]
async fn first_mismatch_creates_one_apex_record() {
    let client = Arc::new(MockZoneClient::new());

    let reconciler = Reconciler::new(client.clone(), "example.com");
    let result = reconciler
        .reconcile(
            Vec::new(),
            AddressFamily::V4,
            &PublicAddress::new("203.0.113.7"),
        )
        .await
        .expect("pass succeeds");

    assert_eq!(client.create_call_count(), 1);
    assert_eq!(client.refresh_call_count(), 1);
    assert_eq!(client.update_call_count(), 0);

    let created = client
        .calls()
        .into_iter()
        .find_map(|c| match c {
            Call::Create(data) => Some(data),
            _ => None,
        })
        .expect("create call recorded");
    assert_eq!(created.record_type, RecordType::A);
    assert_eq!(created.subdomain, "", "new record is created at the apex");
    assert_eq!(created.target, "203.0.113.7");
    assert_eq!(created.ttl, 0, "ttl 0 leaves the provider default in place");

    // The created record is deliberately not adopted in the same pass; the
    // next pass's discovery picks it up by listing.
    assert!(
        result.is_empty(),
        "state stays empty until the next discovery cycle"
    );
}

#[tokio::test]
async fn created_record_is_adopted_on_the_following_pass() {
    let client = Arc::new(MockZoneClient::new());
    let reconciler = Reconciler::new(client.clone(), "example.com");
    let address = PublicAddress::new("203.0.113.7");

    let after_create = reconciler
        .reconcile(Vec::new(), AddressFamily::V4, &address)
        .await
        .expect("create pass succeeds");
    assert!(after_create.is_empty());

    let after_discovery = reconciler
        .reconcile(after_create, AddressFamily::V4, &address)
        .await
        .expect("discovery pass succeeds");

    assert_eq!(after_discovery.len(), 1);
    assert_eq!(after_discovery[0].target, "203.0.113.7");
    assert_eq!(client.create_call_count(), 1, "no second creation");
}

#[tokio::test]
async fn address_change_updates_every_previous_record() {
    let client = Arc::new(MockZoneClient::new());
    // The provider still holds the stale address.
    client.seed_record(
        10,
        RecordData {
            record_type: RecordType::A,
            subdomain: "home".to_string(),
            target: "192.0.2.1".to_string(),
            ttl: 300,
        },
    );
    client.seed_record(
        11,
        RecordData {
            record_type: RecordType::A,
            subdomain: "office".to_string(),
            target: "192.0.2.1".to_string(),
            ttl: 300,
        },
    );

    let previous = vec![
        managed(10, RecordType::A, "home", "192.0.2.1", 300),
        managed(11, RecordType::A, "office", "192.0.2.1", 300),
    ];

    let reconciler = Reconciler::new(client.clone(), "example.com");
    let result = reconciler
        .reconcile(
            previous.clone(),
            AddressFamily::V4,
            &PublicAddress::new("203.0.113.7"),
        )
        .await
        .expect("pass succeeds");

    assert_eq!(client.update_call_count(), 2);
    assert_eq!(client.refresh_call_count(), 1, "one refresh for the whole batch");
    assert_eq!(client.create_call_count(), 0);

    for (id, subdomain) in [(10, "home"), (11, "office")] {
        let updated = client.stored_record(id).expect("record present");
        assert_eq!(updated.target, "203.0.113.7");
        assert_eq!(updated.subdomain, subdomain, "subdomain preserved");
        assert_eq!(updated.ttl, 300, "ttl preserved");
        assert_eq!(updated.record_type, RecordType::A);
    }

    // The known set is returned unchanged; the next discovery re-validates.
    assert_eq!(result, previous);
}

#[tokio::test]
async fn refresh_follows_the_last_update() {
    let client = Arc::new(MockZoneClient::new());
    let previous = vec![
        managed(10, RecordType::A, "home", "192.0.2.1", 300),
        managed(11, RecordType::A, "office", "192.0.2.1", 300),
    ];

    let reconciler = Reconciler::new(client.clone(), "example.com");
    reconciler
        .reconcile(
            previous,
            AddressFamily::V4,
            &PublicAddress::new("203.0.113.7"),
        )
        .await
        .expect("pass succeeds");

    let calls = client.calls();
    let refresh_pos = calls.iter().position(|c| matches!(c, Call::Refresh)).unwrap();
    let last_update_pos = calls
        .iter()
        .rposition(|c| matches!(c, Call::Update(_, _)))
        .unwrap();
    assert!(
        refresh_pos > last_update_pos,
        "zone refresh must come after all updates"
    );
}
