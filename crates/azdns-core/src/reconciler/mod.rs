//! AAAA record reconciler
//!
//! The reconciler converges a remote AAAA record set to a local desired
//! state, and projects the remote record set back into local state.
//!
//! ## Lifecycle
//!
//! ```text
//!   create_or_update ──► [guard GET] ──► PUT ──► GET (id) ──► read
//!   read             ──► GET ──► overwrite local fields  (404 → clear id)
//!   delete           ──► DELETE ──► clear id              (non-200 → error)
//!   import           ──► read from a bare id
//! ```
//!
//! Remote calls are issued one at a time. The host guarantees at most one
//! in-flight operation per record set; nothing here locks.

pub mod fields;

use crate::error::{Error, Operation, Result};
use crate::resource_id::{DNS_ZONES_KEY, ResourceId};
use crate::tags;
use crate::timeouts::TimeoutsConfig;
use crate::traits::{Lookup, Precondition, RecordSetsApi};
use crate::types::{
    AaaaRecordState, RecordSet, RecordSetKey, RecordSetProperties, RecordType, SubResource,
};
use fields::{expand_aaaa_records, flatten_aaaa_records};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resource type name reported in import-guard errors
pub const RESOURCE_TYPE: &str = "azurerm_dns_aaaa_record";

/// Options for [`AaaaRecordReconciler::create_or_update`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Refuse to adopt an existing remote record set for a new local entry
    pub import_guard: bool,
    /// The local entry has never been created
    pub is_new: bool,
}

impl ApplyOptions {
    /// Options for creating a new local entry
    pub fn create(import_guard: bool) -> Self {
        Self {
            import_guard,
            is_new: true,
        }
    }

    /// Options for updating an existing local entry
    pub fn update() -> Self {
        Self {
            import_guard: false,
            is_new: false,
        }
    }
}

/// Reconciler for DNS AAAA record sets
pub struct AaaaRecordReconciler {
    client: Arc<dyn RecordSetsApi>,
    timeouts: TimeoutsConfig,
}

impl AaaaRecordReconciler {
    /// Create a reconciler driving `client`
    pub fn new(client: Arc<dyn RecordSetsApi>, timeouts: TimeoutsConfig) -> Self {
        Self { client, timeouts }
    }

    /// Create or update the record set described by `state`
    ///
    /// On success `state.id` holds the remote ID and every field has been
    /// refreshed from the remote record set.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`]: `state` is invalid (no remote call is made)
    /// - [`Error::AlreadyExists`]: the import guard found an unmanaged record set
    /// - [`Error::Remote`]: a remote call failed or timed out
    /// - [`Error::MissingId`]: the record set was written but has no ID
    pub async fn create_or_update(
        &self,
        state: &mut AaaaRecordState,
        options: ApplyOptions,
    ) -> Result<()> {
        state.validate()?;

        let key = state.key();
        let deadline = self.timeouts.for_create_update(options.is_new);

        info!(
            "{} DNS AAAA record {} via {}",
            if options.is_new { "Creating" } else { "Updating" },
            key,
            self.client.api_name()
        );

        if options.import_guard && options.is_new {
            debug!("Checking for an existing record set at {}", key);
            let existing = deadline
                .run(self.client.get(&key))
                .await
                .map_err(with_context(Operation::CheckingExisting, &key))?;

            if let Some(id) = existing
                .found()
                .and_then(|record_set| record_set.id)
                .filter(|id| !id.is_empty())
            {
                warn!("Refusing to adopt existing record set {}", id);
                return Err(Error::AlreadyExists {
                    resource_type: RESOURCE_TYPE,
                    id,
                });
            }
        }

        let parameters = build_parameters(state);
        deadline
            .run(
                self.client
                    .create_or_update(&key, &parameters, &Precondition::none()),
            )
            .await
            .map_err(with_context(Operation::CreatingOrUpdating, &key))?;

        let written = deadline
            .run(self.client.get(&key))
            .await
            .map_err(with_context(Operation::Retrieving, &key))?;

        let record_set = match written {
            Lookup::Found(record_set) => record_set,
            Lookup::NotFound => {
                return Err(Error::remote(
                    Operation::Retrieving,
                    &key.name,
                    &key.zone_name,
                    &key.resource_group,
                    Error::not_found(format!("record set {} is missing after write", key)),
                ));
            }
        };

        let id = record_set
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::MissingId {
                name: key.name.clone(),
                zone: key.zone_name.clone(),
                resource_group: key.resource_group.clone(),
            })?;

        debug!("Record set {} has ID {}", key, id);
        state.id = Some(id);

        self.read(state).await
    }

    /// Refresh `state` from the remote record set its ID points to
    ///
    /// If the record set no longer exists `state.id` is cleared and `Ok(())`
    /// is returned.
    pub async fn read(&self, state: &mut AaaaRecordState) -> Result<()> {
        let key = key_from_id(state.id.as_deref())?;
        let deadline = self.timeouts.for_read();

        debug!("Reading DNS AAAA record {}", key);
        let lookup = deadline
            .run(self.client.get(&key))
            .await
            .map_err(with_context(Operation::Reading, &key))?;

        let record_set = match lookup {
            Lookup::Found(record_set) => record_set,
            Lookup::NotFound => {
                warn!("DNS AAAA record {} no longer exists, removing from state", key);
                state.id = None;
                return Ok(());
            }
        };

        let properties = record_set.properties.unwrap_or_default();

        state.name = key.name;
        state.resource_group_name = key.resource_group;
        state.zone_name = key.zone_name;
        state.ttl = properties.ttl.unwrap_or_default();
        state.fqdn = properties.fqdn;
        state.target_resource_id = properties
            .target_resource
            .and_then(|target| target.id)
            .filter(|id| !id.is_empty());

        // An alias record set answers with an empty address list.
        if let Some(records) = properties.aaaa_records.as_deref() {
            state.records = if records.is_empty() && state.target_resource_id.is_some() {
                None
            } else {
                Some(flatten_aaaa_records(records))
            };
        }

        state.tags = tags::flatten(properties.metadata.as_ref());
        Ok(())
    }

    /// Delete the record set `state.id` points to, then clear `state.id`
    ///
    /// # Errors
    ///
    /// - [`Error::Remote`]: the call failed, or answered non-OK with a detail
    /// - [`Error::UnexpectedDeleteStatus`]: answered non-OK without any detail
    pub async fn delete(&self, state: &mut AaaaRecordState) -> Result<()> {
        let key = key_from_id(state.id.as_deref())?;
        let deadline = self.timeouts.for_delete();

        info!("Deleting DNS AAAA record {}", key);
        let response = deadline
            .run(self.client.delete(&key, &Precondition::none()))
            .await
            .map_err(with_context(Operation::Deleting, &key))?;

        if !response.is_ok() {
            return Err(match response.detail {
                Some(detail) => Error::remote(
                    Operation::Deleting,
                    &key.name,
                    &key.zone_name,
                    &key.resource_group,
                    Error::api(response.status, detail.code, detail.message),
                ),
                None => Error::UnexpectedDeleteStatus {
                    status: response.status,
                    name: key.name,
                    zone: key.zone_name,
                    resource_group: key.resource_group,
                },
            });
        }

        state.id = None;
        Ok(())
    }

    /// Build local state for an existing record set from its ID
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidResourceId`]: `id` is not an AAAA record-set ID
    /// - [`Error::NotFound`]: no record set exists at `id`
    pub async fn import(&self, id: &str) -> Result<AaaaRecordState> {
        info!("Importing DNS AAAA record {}", id);

        let mut state = AaaaRecordState {
            id: Some(id.to_string()),
            ..AaaaRecordState::default()
        };
        self.read(&mut state).await?;

        if state.id.is_none() {
            return Err(Error::not_found(format!(
                "DNS AAAA Record {:?} does not exist",
                id
            )));
        }
        Ok(state)
    }
}

/// Recover the record-set key from a stored ID
fn key_from_id(id: Option<&str>) -> Result<RecordSetKey> {
    let raw = id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::invalid_resource_id("resource has no ID"))?;

    let parsed = ResourceId::parse(raw)?;
    let name = parsed.require_segment(RecordType::Aaaa.as_str())?;
    let zone = parsed.require_segment(DNS_ZONES_KEY)?;
    if parsed.resource_group.is_empty() {
        return Err(Error::invalid_resource_id(format!(
            "ID {:?} has no resource group",
            raw
        )));
    }

    Ok(RecordSetKey::new(
        parsed.resource_group.as_str(),
        zone,
        name,
        RecordType::Aaaa,
    ))
}

/// Request payload for a create/update
fn build_parameters(state: &AaaaRecordState) -> RecordSet {
    let records = state.configured_records().cloned().unwrap_or_default();

    RecordSet {
        name: Some(state.name.clone()),
        properties: Some(RecordSetProperties {
            metadata: Some(tags::expand(&state.tags)),
            ttl: Some(state.ttl),
            aaaa_records: Some(expand_aaaa_records(&records)),
            target_resource: Some(SubResource {
                id: state.configured_target().map(String::from),
            }),
            ..RecordSetProperties::default()
        }),
        ..RecordSet::default()
    }
}

fn with_context(operation: Operation, key: &RecordSetKey) -> impl FnOnce(Error) -> Error + '_ {
    move |source| {
        Error::remote(
            operation,
            &key.name,
            &key.zone_name,
            &key.resource_group,
            source,
        )
    }
}
