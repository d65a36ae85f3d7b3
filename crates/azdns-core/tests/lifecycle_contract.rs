//! Contract Test: Create / Read Lifecycle
//!
//! Constraints verified:
//! - A successful create stores the remote ID and refreshes every field
//! - Read reproduces what was written (records or alias target)
//! - Read reports an address list emptied outside the reconciler
//! - Read of a vanished record set clears the ID without failing
//! - A write that yields no ID is reported as a consistency error

mod common;

use azdns_core::error::{Error, Operation};
use azdns_core::types::{RecordSet, RecordSetProperties};
use azdns_core::{AaaaRecordState, ApplyOptions};
use common::*;
use std::collections::{BTreeMap, BTreeSet};

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn create_then_read_reproduces_records_and_fqdn() {
    let api = InMemoryRecordSets::new();
    let reconciler = reconciler(&api);

    let mut state = AaaaRecordState::with_records("www", "example.com", "rg1", 300, ["2001:db8::1"]);
    reconciler
        .create_or_update(&mut state, ApplyOptions::create(true))
        .await
        .expect("create succeeds");

    assert_eq!(
        state.id.as_deref(),
        Some("/subscriptions/11111111-2222-3333-4444-555555555555/resourceGroups/rg1/providers/Microsoft.Network/dnszones/example.com/AAAA/www")
    );
    assert_eq!(state.ttl, 300);
    assert_eq!(state.records, Some(set(&["2001:db8::1"])));
    assert_eq!(state.fqdn.as_deref(), Some("www.example.com."));
    assert_eq!(state.target_resource_id, None);

    // A fresh read from only the ID yields the same state
    let mut refreshed = AaaaRecordState {
        id: state.id.clone(),
        ..AaaaRecordState::default()
    };
    reconciler.read(&mut refreshed).await.expect("read succeeds");
    assert_eq!(refreshed, state);
}

#[tokio::test]
async fn create_issues_guard_get_put_and_confirming_gets() {
    let api = InMemoryRecordSets::new();
    let reconciler = reconciler(&api);

    let mut state = AaaaRecordState::with_records("www", "example.com", "rg1", 300, ["2001:db8::1"]);
    reconciler
        .create_or_update(&mut state, ApplyOptions::create(true))
        .await
        .unwrap();

    // guard GET + PUT + confirming GET + read GET
    assert_eq!(api.put_calls(), 1);
    assert_eq!(api.get_calls(), 3);
    assert_eq!(api.delete_calls(), 0);
}

#[tokio::test]
async fn alias_record_leaves_records_unset() {
    let api = InMemoryRecordSets::new();
    let reconciler = reconciler(&api);

    let mut state = AaaaRecordState::with_target("www", "example.com", "rg1", 60, PIP_ID);
    reconciler
        .create_or_update(&mut state, ApplyOptions::create(true))
        .await
        .expect("alias create succeeds");

    assert_eq!(state.records, None);
    assert_eq!(state.target_resource_id.as_deref(), Some(PIP_ID));

    // The service keeps an empty address list next to the target
    let stored = api.stored(&state.key()).unwrap();
    assert_eq!(stored.properties.unwrap().aaaa_records, Some(Vec::new()));
}

#[tokio::test]
async fn read_detects_addresses_emptied_out_of_band() {
    let api = InMemoryRecordSets::new();
    let reconciler = reconciler(&api);

    let mut state = AaaaRecordState::with_records("www", "example.com", "rg1", 300, ["2001:db8::1"]);
    reconciler
        .create_or_update(&mut state, ApplyOptions::create(true))
        .await
        .unwrap();

    api.seed(
        &state.key(),
        RecordSet {
            properties: Some(RecordSetProperties {
                ttl: Some(300),
                aaaa_records: Some(Vec::new()),
                ..RecordSetProperties::default()
            }),
            ..RecordSet::default()
        },
    );
    reconciler.read(&mut state).await.expect("read succeeds");

    assert_eq!(state.records, Some(BTreeSet::new()));
    assert_eq!(state.target_resource_id, None);
    assert!(state.id.is_some());
}

#[tokio::test]
async fn update_overwrites_ttl_records_and_tags() {
    let api = InMemoryRecordSets::new();
    let reconciler = reconciler(&api);

    let mut state = AaaaRecordState::with_records("www", "example.com", "rg1", 300, ["2001:db8::1"]);
    reconciler
        .create_or_update(&mut state, ApplyOptions::create(true))
        .await
        .unwrap();

    state.ttl = 3600;
    state.records = Some(set(&["2001:db8::2", "2001:db8::3"]));
    state.tags = BTreeMap::from([("env".to_string(), "staging".to_string())]);
    reconciler
        .create_or_update(&mut state, ApplyOptions::update())
        .await
        .expect("update succeeds");

    assert_eq!(state.ttl, 3600);
    assert_eq!(state.records, Some(set(&["2001:db8::2", "2001:db8::3"])));
    assert_eq!(state.tags.get("env").map(String::as_str), Some("staging"));
    assert_eq!(api.put_calls(), 2);
}

#[tokio::test]
async fn read_of_missing_record_clears_id() {
    let api = InMemoryRecordSets::new();
    let reconciler = reconciler(&api);

    let mut state = AaaaRecordState::with_records("www", "example.com", "rg1", 300, ["2001:db8::1"]);
    reconciler
        .create_or_update(&mut state, ApplyOptions::create(true))
        .await
        .unwrap();

    api.remove_out_of_band(&state.key());
    reconciler.read(&mut state).await.expect("not-found is not an error");

    assert_eq!(state.id, None);
}

#[tokio::test]
async fn read_wraps_transport_failures_with_record_context() {
    let api = InMemoryRecordSets::new();
    let reconciler = reconciler(&api);

    let mut state = AaaaRecordState::with_records("www", "example.com", "rg1", 300, ["2001:db8::1"]);
    reconciler
        .create_or_update(&mut state, ApplyOptions::create(true))
        .await
        .unwrap();

    api.fail_transport();
    let err = reconciler.read(&mut state).await.unwrap_err();

    match &err {
        Error::Remote {
            operation,
            name,
            zone,
            resource_group,
            ..
        } => {
            assert_eq!(*operation, Operation::Reading);
            assert_eq!(name, "www");
            assert_eq!(zone, "example.com");
            assert_eq!(resource_group, "rg1");
        }
        other => panic!("expected remote error, got {:?}", other),
    }
    assert!(state.id.is_some(), "failed read must not clear the ID");
}

#[tokio::test]
async fn write_without_id_is_a_consistency_error() {
    let api = InMemoryRecordSets::new();
    api.omit_ids();
    let reconciler = reconciler(&api);

    let mut state = AaaaRecordState::with_records("www", "example.com", "rg1", 300, ["2001:db8::1"]);
    let err = reconciler
        .create_or_update(&mut state, ApplyOptions::create(false))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingId { .. }), "got {:?}", err);
    assert_eq!(state.id, None);
}

#[tokio::test]
async fn import_builds_state_from_id() {
    let api = InMemoryRecordSets::new();
    let reconciler = reconciler(&api);

    let mut managed = AaaaRecordState::with_records("api", "example.com", "rg1", 120, ["2001:db8::a"])
        .tagged(BTreeMap::from([("team".to_string(), "edge".to_string())]));
    reconciler
        .create_or_update(&mut managed, ApplyOptions::create(true))
        .await
        .unwrap();

    let imported = reconciler
        .import(managed.id.as_deref().unwrap())
        .await
        .expect("import succeeds");
    assert_eq!(imported, managed);
}

#[tokio::test]
async fn import_of_missing_record_is_not_found() {
    let api = InMemoryRecordSets::new();
    let reconciler = reconciler(&api);

    let id = "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Network/dnszones/example.com/AAAA/ghost";
    let err = reconciler.import(id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
