//! Local and remote record-set types
//!
//! [`AaaaRecordState`] is the local (desired / observed) representation the
//! host persists. [`RecordSet`] mirrors the Resource Manager JSON payload.

use crate::error::{Error, Result};
use crate::resource_id::validate_resource_id;
use crate::tags::{self, Metadata};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::Ipv6Addr;

/// Maximum resource group name length
const MAX_RESOURCE_GROUP_LEN: usize = 90;

/// Azure DNS record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Caa,
    Cname,
    Mx,
    Ns,
    Ptr,
    Soa,
    Srv,
    Txt,
}

impl RecordType {
    /// Path segment used by the DNS API
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Caa => "CAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Soa => "SOA",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a record set within a subscription
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordSetKey {
    pub resource_group: String,
    pub zone_name: String,
    pub name: String,
    pub record_type: RecordType,
}

impl RecordSetKey {
    pub fn new(
        resource_group: impl Into<String>,
        zone_name: impl Into<String>,
        name: impl Into<String>,
        record_type: RecordType,
    ) -> Self {
        Self {
            resource_group: resource_group.into(),
            zone_name: zone_name.into(),
            name: name.into(),
            record_type,
        }
    }
}

impl fmt::Display for RecordSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.resource_group, self.zone_name, self.record_type, self.name
        )
    }
}

/// A record set as returned / accepted by the DNS API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<RecordSetProperties>,
}

/// The `properties` object of a record set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(rename = "TTL", default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// Server computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,

    /// Server computed
    #[serde(
        rename = "provisioningState",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provisioning_state: Option<String>,

    #[serde(
        rename = "targetResource",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_resource: Option<SubResource>,

    /// Absent for alias record sets
    #[serde(
        rename = "AAAARecords",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub aaaa_records: Option<Vec<AaaaRecord>>,
}

/// A single IPv6 address entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaaaRecord {
    #[serde(
        rename = "ipv6Address",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ipv6_address: Option<String>,
}

/// Reference to another ARM resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Local state of a managed AAAA record set
///
/// Used both as the desired configuration handed to create/update and as
/// the observed state written back by read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaaaRecordState {
    /// Composite ARM ID; `None` until created, and again once the record is gone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Record name within the zone (changing it forces replacement)
    pub name: String,

    /// Resource group containing the zone (changing it forces replacement)
    pub resource_group_name: String,

    pub zone_name: String,

    pub ttl: u32,

    /// IPv6 addresses; conflicts with `target_resource_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<BTreeSet<String>>,

    /// Alias target; conflicts with `records`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_resource_id: Option<String>,

    /// Server computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl AaaaRecordState {
    /// Create a desired state with explicit addresses
    pub fn with_records<I, S>(
        name: impl Into<String>,
        zone_name: impl Into<String>,
        resource_group_name: impl Into<String>,
        ttl: u32,
        records: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            zone_name: zone_name.into(),
            resource_group_name: resource_group_name.into(),
            ttl,
            records: Some(records.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Create a desired state aliasing another resource
    pub fn with_target(
        name: impl Into<String>,
        zone_name: impl Into<String>,
        resource_group_name: impl Into<String>,
        ttl: u32,
        target_resource_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            zone_name: zone_name.into(),
            resource_group_name: resource_group_name.into(),
            ttl,
            target_resource_id: Some(target_resource_id.into()),
            ..Self::default()
        }
    }

    /// Attach tags
    pub fn tagged(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// The record-set key this state addresses
    pub fn key(&self) -> RecordSetKey {
        RecordSetKey::new(
            &self.resource_group_name,
            &self.zone_name,
            &self.name,
            RecordType::Aaaa,
        )
    }

    /// Explicit addresses, if any are configured
    pub fn configured_records(&self) -> Option<&BTreeSet<String>> {
        self.records.as_ref().filter(|r| !r.is_empty())
    }

    /// Alias target, if one is configured
    pub fn configured_target(&self) -> Option<&str> {
        self.target_resource_id
            .as_deref()
            .filter(|t| !t.is_empty())
    }

    /// Boundary validation run before any remote call
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::validation("\"name\" cannot be empty"));
        }
        if self.zone_name.is_empty() {
            return Err(Error::validation("\"zone_name\" cannot be empty"));
        }
        validate_resource_group_name(&self.resource_group_name)?;

        match (self.configured_records(), self.configured_target()) {
            (None, None) => {
                return Err(Error::validation(
                    "Neither 'records' nor 'target_resource_id' is defined",
                ));
            }
            (Some(_), Some(_)) => {
                return Err(Error::validation(
                    "'records' conflicts with 'target_resource_id'; only one may be set",
                ));
            }
            (Some(records), None) => {
                for record in records {
                    record.parse::<Ipv6Addr>().map_err(|_| {
                        Error::validation(format!("{:?} is not a valid IPv6 address", record))
                    })?;
                }
            }
            (None, Some(target)) => {
                validate_resource_id(target).map_err(|e| {
                    Error::validation(format!("\"target_resource_id\": {}", e))
                })?;
            }
        }

        tags::validate(&self.tags)
    }
}

/// Validate a resource group name
///
/// Up to 90 characters: alphanumerics, underscores, hyphens, periods and
/// parentheses, not ending in a period.
pub fn validate_resource_group_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation("resource group name cannot be blank"));
    }
    if name.chars().count() > MAX_RESOURCE_GROUP_LEN {
        return Err(Error::validation(format!(
            "resource group name may not exceed {} characters in length",
            MAX_RESOURCE_GROUP_LEN
        )));
    }
    if name.ends_with('.') {
        return Err(Error::validation("resource group name may not end with a period"));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '(' | ')'))
    {
        return Err(Error::validation(format!(
            "resource group name {:?} may only contain alphanumeric characters, dash, \
             underscores, parentheses and periods",
            name
        )));
    }
    Ok(())
}
