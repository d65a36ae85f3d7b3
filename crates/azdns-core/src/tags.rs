//! Tag codec
//!
//! Locally, tags are a plain string map. On the wire, record-set metadata
//! values are nullable.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Maximum number of tags on a resource
pub const MAX_TAGS: usize = 50;

/// Maximum tag key length
pub const MAX_TAG_KEY_LEN: usize = 512;

/// Maximum tag value length
pub const MAX_TAG_VALUE_LEN: usize = 256;

/// Remote representation of tags
pub type Metadata = BTreeMap<String, Option<String>>;

/// Convert local tags into record-set metadata
pub fn expand(tags: &BTreeMap<String, String>) -> Metadata {
    tags.iter()
        .map(|(k, v)| (k.clone(), Some(v.clone())))
        .collect()
}

/// Convert record-set metadata into local tags
///
/// Null values become empty strings; absent metadata becomes no tags.
pub fn flatten(metadata: Option<&Metadata>) -> BTreeMap<String, String> {
    metadata
        .map(|m| {
            m.iter()
                .map(|(k, v)| (k.clone(), v.clone().unwrap_or_default()))
                .collect()
        })
        .unwrap_or_default()
}

/// Check the tag limits imposed by the Resource Manager
pub fn validate(tags: &BTreeMap<String, String>) -> Result<()> {
    if tags.len() > MAX_TAGS {
        return Err(Error::validation(format!(
            "a maximum of {} tags can be applied to each resource, got {}",
            MAX_TAGS,
            tags.len()
        )));
    }

    for (key, value) in tags {
        if key.chars().count() > MAX_TAG_KEY_LEN {
            return Err(Error::validation(format!(
                "the maximum length for a tag key is {} characters: {:?}",
                MAX_TAG_KEY_LEN, key
            )));
        }
        if value.chars().count() > MAX_TAG_VALUE_LEN {
            return Err(Error::validation(format!(
                "the maximum length for a tag value is {} characters: value for {:?} is {} characters",
                MAX_TAG_VALUE_LEN,
                key,
                value.chars().count()
            )));
        }
    }

    Ok(())
}
