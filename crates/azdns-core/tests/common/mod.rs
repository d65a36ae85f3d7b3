//! Test doubles and common utilities for reconciler contract tests
//!
//! This module provides an in-memory stand-in for the DNS record-set API
//! that behaves like the Resource Manager for the calls the reconciler makes.

#![allow(dead_code)]

use azdns_core::error::{Error, Result};
use azdns_core::resource_id::record_set_id;
use azdns_core::traits::{ApiErrorDetail, DeleteResponse, Lookup, Precondition, RecordSetsApi};
use azdns_core::types::{RecordSet, RecordSetKey};
use azdns_core::{AaaaRecordReconciler, TimeoutsConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SUBSCRIPTION: &str = "11111111-2222-3333-4444-555555555555";

pub const PIP_ID: &str = "/subscriptions/11111111-2222-3333-4444-555555555555/resourceGroups/rg1/providers/Microsoft.Network/publicIPAddresses/pip1";

/// An in-memory record-set API that counts calls
#[derive(Default)]
pub struct InMemoryRecordSets {
    records: Mutex<HashMap<RecordSetKey, RecordSet>>,
    get_calls: AtomicUsize,
    put_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    /// Return record sets without an ID (simulates an inconsistent API)
    omit_ids: AtomicBool,
    /// Fail every call with a transport error
    fail_transport: AtomicBool,
    /// Answer deletes with this status + detail instead of the real outcome
    forced_delete: Mutex<Option<DeleteResponse>>,
    /// Never answer reads
    hang_reads: AtomicBool,
    /// Acknowledge writes without storing them
    forget_writes: AtomicBool,
}

impl InMemoryRecordSets {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed a record set as if it had been created outside the reconciler
    pub fn seed(&self, key: &RecordSetKey, record_set: RecordSet) {
        let stored = self.materialize(key, record_set);
        self.records.lock().unwrap().insert(key.clone(), stored);
    }

    /// Remove a record set behind the reconciler's back
    pub fn remove_out_of_band(&self, key: &RecordSetKey) {
        self.records.lock().unwrap().remove(key);
    }

    pub fn stored(&self, key: &RecordSetKey) -> Option<RecordSet> {
        self.records.lock().unwrap().get(key).cloned()
    }

    pub fn omit_ids(&self) {
        self.omit_ids.store(true, Ordering::SeqCst);
    }

    pub fn fail_transport(&self) {
        self.fail_transport.store(true, Ordering::SeqCst);
    }

    pub fn hang_reads(&self) {
        self.hang_reads.store(true, Ordering::SeqCst);
    }

    pub fn forget_writes(&self) {
        self.forget_writes.store(true, Ordering::SeqCst);
    }

    pub fn force_delete_response(&self, response: DeleteResponse) {
        *self.forced_delete.lock().unwrap() = Some(response);
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.get_calls() + self.put_calls() + self.delete_calls()
    }

    /// Fill in the server-computed fields the way the Resource Manager does
    fn materialize(&self, key: &RecordSetKey, mut record_set: RecordSet) -> RecordSet {
        record_set.id = Some(record_set_id(SUBSCRIPTION, key));
        record_set.name = Some(key.name.clone());
        record_set.resource_type = Some(format!("Microsoft.Network/dnszones/{}", key.record_type));
        record_set.etag = Some(format!("etag-{}", self.put_calls()));

        let mut properties = record_set.properties.unwrap_or_default();
        properties.fqdn = Some(format!("{}.{}.", key.name, key.zone_name));
        properties.provisioning_state = Some("Succeeded".to_string());

        record_set.properties = Some(properties);
        record_set
    }

    fn check_transport(&self) -> Result<()> {
        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(Error::http("connection refused"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordSetsApi for InMemoryRecordSets {
    async fn get(&self, key: &RecordSetKey) -> Result<Lookup<RecordSet>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check_transport()?;

        if self.hang_reads.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        let found = self.records.lock().unwrap().get(key).cloned();
        Ok(match found {
            Some(mut record_set) => {
                if self.omit_ids.load(Ordering::SeqCst) {
                    record_set.id = None;
                }
                Lookup::Found(record_set)
            }
            None => Lookup::NotFound,
        })
    }

    async fn create_or_update(
        &self,
        key: &RecordSetKey,
        parameters: &RecordSet,
        _precondition: &Precondition,
    ) -> Result<RecordSet> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.check_transport()?;

        let stored = self.materialize(key, parameters.clone());
        if !self.forget_writes.load(Ordering::SeqCst) {
            self.records
                .lock()
                .unwrap()
                .insert(key.clone(), stored.clone());
        }
        Ok(stored)
    }

    async fn delete(
        &self,
        key: &RecordSetKey,
        _precondition: &Precondition,
    ) -> Result<DeleteResponse> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_transport()?;

        if let Some(forced) = self.forced_delete.lock().unwrap().clone() {
            return Ok(forced);
        }

        // The Resource Manager answers 204 No Content when there was nothing to delete
        Ok(match self.records.lock().unwrap().remove(key) {
            Some(_) => DeleteResponse::ok(),
            None => DeleteResponse {
                status: 204,
                detail: None,
            },
        })
    }

    fn api_name(&self) -> &'static str {
        "in-memory"
    }
}

/// A reconciler over the given double with default timeouts
pub fn reconciler(api: &Arc<InMemoryRecordSets>) -> AaaaRecordReconciler {
    AaaaRecordReconciler::new(api.clone(), TimeoutsConfig::default())
}

pub fn conflict_detail() -> ApiErrorDetail {
    ApiErrorDetail {
        code: "Conflict".to_string(),
        message: "The zone is being modified".to_string(),
    }
}
