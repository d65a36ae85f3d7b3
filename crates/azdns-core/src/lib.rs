// # azdns-core
//
// Core library for reconciling Azure DNS AAAA record sets.
//
// ## Architecture Overview
//
// This library provides everything a host needs to manage one AAAA record
// set declaratively:
// - **RecordSetsApi**: Trait for the remote DNS record-set API (get / put / delete)
// - **AaaaRecordReconciler**: Converges remote state to a local desired state
//   and projects remote state back into the local representation
// - **ResourceId**: Codec for ARM resource identifiers
// - **tags**: Codec between local tags and remote record-set metadata
// - **Deadline**: Per-operation timeout budgets
//
// ## Design Principles
//
// 1. **Separation of Concerns**: The reconciler never speaks HTTP; the
//    `azdns-provider-azure` crate implements `RecordSetsApi`
// 2. **Typed State**: Local state is a plain struct validated at the boundary
// 3. **Explicit Outcomes**: Not-found is a value (`Lookup::NotFound`), not an error
// 4. **No Hidden Retries**: Every failure is returned to the host with context

pub mod config;
pub mod error;
pub mod reconciler;
pub mod resource_id;
pub mod tags;
pub mod timeouts;
pub mod traits;
pub mod types;

// Re-export core types for convenience
pub use config::{AzureConfig, CredentialConfig, FeaturesConfig, ReconcilerConfig};
pub use error::{Error, Operation, Result};
pub use reconciler::{AaaaRecordReconciler, ApplyOptions};
pub use resource_id::ResourceId;
pub use timeouts::{Deadline, TimeoutsConfig};
pub use traits::{ApiErrorDetail, DeleteResponse, Lookup, Precondition, RecordSetsApi};
pub use types::{AaaaRecord, AaaaRecordState, RecordSet, RecordSetKey, RecordType};
