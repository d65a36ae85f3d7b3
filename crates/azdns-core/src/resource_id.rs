//! ARM resource identifier codec
//!
//! Resource IDs look like
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/{type}/{name}/...`,
//! i.e. a sequence of key/value path segments. [`ResourceId::parse`] splits
//! them into the subscription, resource group, provider namespace and a map
//! of the remaining keys.

use crate::error::{Error, Result};
use crate::types::RecordSetKey;
use std::collections::HashMap;

/// Path key of the DNS zone container in a record-set ID
pub const DNS_ZONES_KEY: &str = "dnszones";

/// A parsed ARM resource identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    /// Subscription the resource belongs to
    pub subscription_id: String,
    /// Resource group (empty for subscription-level resources)
    pub resource_group: String,
    /// Provider namespace, e.g. `Microsoft.Network`
    pub provider: String,
    /// Remaining key/value segments
    pub path: HashMap<String, String>,
}

impl ResourceId {
    /// Parse a resource ID
    ///
    /// # Errors
    ///
    /// - the ID does not start with `/`
    /// - the number of segments is odd
    /// - a key or value is empty
    /// - no `subscriptions` segment is present
    pub fn parse(id: &str) -> Result<Self> {
        let trimmed = id.trim();
        let path = trimmed.strip_prefix('/').ok_or_else(|| {
            Error::invalid_resource_id(format!("Cannot parse Azure ID {:?}: must start with '/'", id))
        })?;
        let path = path.strip_suffix('/').unwrap_or(path);

        let components: Vec<&str> = path.split('/').collect();
        if components.len() % 2 != 0 {
            return Err(Error::invalid_resource_id(format!(
                "The number of path segments is not divisible by 2 in {:?}",
                path
            )));
        }

        let mut subscription_id = None;
        let mut segments = HashMap::with_capacity(components.len() / 2);
        for pair in components.chunks(2) {
            let (key, value) = (pair[0], pair[1]);
            if key.is_empty() || value.is_empty() {
                return Err(Error::invalid_resource_id(format!(
                    "Key/Value cannot be empty strings. Key: '{}', Value: '{}'",
                    key, value
                )));
            }

            // Nested "subscriptions" segments (e.g. Service Bus) must not
            // override the leading one.
            if key == "subscriptions" && subscription_id.is_none() {
                subscription_id = Some(value.to_string());
            } else {
                segments.insert(key.to_string(), value.to_string());
            }
        }

        let subscription_id = subscription_id.ok_or_else(|| {
            Error::invalid_resource_id(format!("No subscription ID found in: {:?}", path))
        })?;

        let resource_group = segments
            .remove("resourceGroups")
            .or_else(|| segments.remove("resourcegroups"))
            .unwrap_or_default();
        let provider = segments.remove("providers").unwrap_or_default();

        Ok(Self {
            subscription_id,
            resource_group,
            provider,
            path: segments,
        })
    }

    /// Look up a path segment by key
    ///
    /// Exact matches win; otherwise the key is matched ignoring ASCII case,
    /// since the Resource Manager is not consistent about casing
    /// (`dnsZones` vs `dnszones`).
    pub fn segment(&self, key: &str) -> Option<&str> {
        self.path.get(key).map(String::as_str).or_else(|| {
            self.path
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str())
        })
    }

    /// Like [`segment`](Self::segment) but fails when the key is missing
    pub fn require_segment(&self, key: &str) -> Result<&str> {
        self.segment(key).ok_or_else(|| {
            Error::invalid_resource_id(format!("ID is missing the {:?} segment", key))
        })
    }
}

/// Check that `id` is a parseable resource ID
pub fn validate_resource_id(id: &str) -> Result<()> {
    ResourceId::parse(id).map(|_| ())
}

/// Build the canonical ID of a record set
pub fn record_set_id(subscription_id: &str, key: &RecordSetKey) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/{}/{}/{}/{}",
        subscription_id,
        key.resource_group,
        DNS_ZONES_KEY,
        key.zone_name,
        key.record_type,
        key.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordType;

    const RECORD_ID: &str = "/subscriptions/11111111-2222-3333-4444-555555555555/resourceGroups/rg1/providers/Microsoft.Network/dnszones/example.com/AAAA/www";

    #[test]
    fn parses_record_set_id() {
        let id = ResourceId::parse(RECORD_ID).unwrap();

        assert_eq!(id.subscription_id, "11111111-2222-3333-4444-555555555555");
        assert_eq!(id.resource_group, "rg1");
        assert_eq!(id.provider, "Microsoft.Network");
        assert_eq!(id.segment("AAAA"), Some("www"));
        assert_eq!(id.segment("dnszones"), Some("example.com"));
        assert_eq!(id.path.len(), 2);
    }

    #[test]
    fn segment_lookup_falls_back_to_case_insensitive() {
        let id = ResourceId::parse(
            "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Network/dnsZones/example.com/AAAA/www",
        )
        .unwrap();

        assert_eq!(id.segment(DNS_ZONES_KEY), Some("example.com"));
        assert!(id.require_segment("CNAME").is_err());
    }

    #[test]
    fn lower_case_resource_groups_key_is_accepted() {
        let id = ResourceId::parse("/subscriptions/s/resourcegroups/rg1").unwrap();
        assert_eq!(id.resource_group, "rg1");
        assert!(id.path.is_empty());
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let id = ResourceId::parse("/subscriptions/s/resourceGroups/rg1/").unwrap();
        assert_eq!(id.resource_group, "rg1");
    }

    #[test]
    fn nested_subscriptions_segment_does_not_override() {
        let id = ResourceId::parse(
            "/subscriptions/outer/resourceGroups/rg/providers/Microsoft.ServiceBus/namespaces/ns/topics/t/subscriptions/inner",
        )
        .unwrap();

        assert_eq!(id.subscription_id, "outer");
        assert_eq!(id.segment("subscriptions"), Some("inner"));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(ResourceId::parse("subscriptions/s").is_err());
        assert!(ResourceId::parse("/subscriptions/s/resourceGroups").is_err());
        assert!(ResourceId::parse("/subscriptions//resourceGroups/rg").is_err());
        assert!(ResourceId::parse("/resourceGroups/rg").is_err());
        assert!(validate_resource_id("").is_err());
    }

    #[test]
    fn built_id_parses_back_to_its_key() {
        let key = RecordSetKey::new("rg1", "example.com", "www", RecordType::Aaaa);
        let id = record_set_id("sub", &key);
        let parsed = ResourceId::parse(&id).unwrap();

        assert_eq!(parsed.resource_group, key.resource_group);
        assert_eq!(parsed.segment(DNS_ZONES_KEY), Some("example.com"));
        assert_eq!(parsed.segment("AAAA"), Some("www"));
    }
}
