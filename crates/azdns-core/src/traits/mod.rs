//! Core traits for the reconciler
//!
//! This module defines the abstract interface the reconciler drives.
//!
//! - [`RecordSetsApi`]: Read, write and delete DNS record sets

pub mod record_sets;

pub use record_sets::{ApiErrorDetail, DeleteResponse, Lookup, Precondition, RecordSetsApi};
