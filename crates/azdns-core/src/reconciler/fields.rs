//! Field transforms between local addresses and remote address entries

use crate::types::AaaaRecord;
use std::collections::BTreeSet;

/// One local address → one remote entry
pub fn expand_aaaa_records(records: &BTreeSet<String>) -> Vec<AaaaRecord> {
    records
        .iter()
        .map(|ipv6| AaaaRecord {
            ipv6_address: Some(ipv6.clone()),
        })
        .collect()
}

/// One remote entry → one local address
///
/// Entries without an address carry nothing to manage and are skipped.
pub fn flatten_aaaa_records(records: &[AaaaRecord]) -> BTreeSet<String> {
    records
        .iter()
        .filter_map(|record| record.ipv6_address.clone())
        .collect()
}
