// # Record Sets API Trait
//
// Defines the interface to the remote DNS record-set API.
//
// ## Implementations
//
// - Azure Resource Manager: `azdns-provider-azure` crate
// - In-memory test double: `tests/common` of this crate
//
// ## Usage
//
// ```rust,ignore
// use azdns_core::{Lookup, RecordSetsApi, RecordSetKey, RecordType};
//
// let key = RecordSetKey::new("rg1", "example.com", "www", RecordType::Aaaa);
// match client.get(&key).await? {
//     Lookup::Found(record_set) => println!("{:?}", record_set.id),
//     Lookup::NotFound => println!("no such record set"),
// }
// ```

use crate::error::Result;
use crate::types::{RecordSet, RecordSetKey};
use async_trait::async_trait;

/// Outcome of a lookup
///
/// Not-found is an expected answer, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The resource exists
    Found(T),
    /// The resource does not exist
    NotFound,
}

impl<T> Lookup<T> {
    /// Convert into an `Option`
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

/// Optimistic concurrency headers for writes
///
/// Empty values are not sent. [`Precondition::none`] allows overwriting
/// whatever is there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Precondition {
    /// Only write if the current ETag matches (`If-Match`)
    pub if_match: Option<String>,
    /// Only write if no resource matches (`If-None-Match`, usually `*`)
    pub if_none_match: Option<String>,
}

impl Precondition {
    /// No precondition: unconditional create, overwrite or delete
    pub fn none() -> Self {
        Self::default()
    }
}

/// Raw result of a DELETE
///
/// The status is reported as-is; interpreting it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResponse {
    /// HTTP status code
    pub status: u16,
    /// Error detail from the response body, when the API supplied one
    pub detail: Option<ApiErrorDetail>,
}

impl DeleteResponse {
    /// A 200 OK response
    pub fn ok() -> Self {
        Self {
            status: 200,
            detail: None,
        }
    }

    /// Whether the record set was deleted by this call
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Error code and message from an API error body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

/// Trait for record-set API implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Contract
///
/// - One remote request per call; no retries or backoff
/// - No caching of record sets between calls
/// - Transport and API failures are returned as errors, except for the
///   outcomes modelled explicitly (`Lookup::NotFound`, `DeleteResponse`)
#[async_trait]
pub trait RecordSetsApi: Send + Sync {
    /// Fetch a record set
    ///
    /// # Returns
    ///
    /// - `Ok(Lookup::Found(_))`: The record set exists
    /// - `Ok(Lookup::NotFound)`: The record set (or its zone) does not exist
    /// - `Err(Error)`: The request failed
    async fn get(&self, key: &RecordSetKey) -> Result<Lookup<RecordSet>>;

    /// Create or replace a record set
    ///
    /// # Parameters
    ///
    /// - `key`: Record set to write
    /// - `parameters`: Full record set payload
    /// - `precondition`: Concurrency headers (see [`Precondition::none`])
    async fn create_or_update(
        &self,
        key: &RecordSetKey,
        parameters: &RecordSet,
        precondition: &Precondition,
    ) -> Result<RecordSet>;

    /// Delete a record set
    ///
    /// # Returns
    ///
    /// - `Ok(DeleteResponse)`: The API answered (with any status)
    /// - `Err(Error)`: No answer was obtained
    async fn delete(&self, key: &RecordSetKey, precondition: &Precondition)
    -> Result<DeleteResponse>;

    /// Get the API name (for logging/debugging)
    fn api_name(&self) -> &'static str;
}
