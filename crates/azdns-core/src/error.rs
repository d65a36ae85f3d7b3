//! Error types for the AAAA record reconciler
//!
//! This module defines all error types used throughout the workspace.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for reconciler operations
pub type Result<T> = std::result::Result<T, Error>;

/// The lifecycle step a remote call was made from
///
/// Used to give remote-call errors a human readable prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Import-guard lookup before a create
    CheckingExisting,
    /// The PUT of a create or update
    CreatingOrUpdating,
    /// The GET following a successful PUT
    Retrieving,
    /// The GET of a read
    Reading,
    /// The DELETE of a delete
    Deleting,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Operation::CheckingExisting => "checking for presence of existing",
            Operation::CreatingOrUpdating => "creating/updating",
            Operation::Retrieving => "retrieving",
            Operation::Reading => "reading",
            Operation::Deleting => "deleting",
        };
        f.write_str(verb)
    }
}

/// Core error type for the reconciler
#[derive(Error, Debug)]
pub enum Error {
    /// Local state failed boundary validation; no remote call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// A record set with the same key already exists remotely and the
    /// import guard refused to adopt it
    #[error(
        "A resource with the ID {id:?} already exists - to be managed it needs to be imported \
         into the state. Please see the documentation for {resource_type:?} for more information."
    )]
    AlreadyExists {
        /// Resource type name (e.g. "azurerm_dns_aaaa_record")
        resource_type: &'static str,
        /// ID of the existing remote resource
        id: String,
    },

    /// A remote call failed; carries the record's identifying context
    #[error(
        "Error {operation} DNS AAAA Record {name:?} (Zone {zone:?} / Resource Group {resource_group:?}): {source}"
    )]
    Remote {
        /// Lifecycle step that issued the call
        operation: Operation,
        /// Record name
        name: String,
        /// DNS zone name
        zone: String,
        /// Resource group name
        resource_group: String,
        /// Underlying cause
        #[source]
        source: Box<Error>,
    },

    /// The remote accepted a write but did not report an ID for it
    #[error("Cannot read DNS AAAA Record {name:?} (Zone {zone:?} / Resource Group {resource_group:?}) ID")]
    MissingId {
        /// Record name
        name: String,
        /// DNS zone name
        zone: String,
        /// Resource group name
        resource_group: String,
    },

    /// DELETE answered with a non-OK status and no error detail
    #[error(
        "Error deleting DNS AAAA Record {name:?} (Zone {zone:?} / Resource Group {resource_group:?}): \
         unexpected status {status} without error detail"
    )]
    UnexpectedDeleteStatus {
        /// HTTP status code returned
        status: u16,
        /// Record name
        name: String,
        /// DNS zone name
        zone: String,
        /// Resource group name
        resource_group: String,
    },

    /// A resource ID could not be parsed or lacks a required segment
    #[error("Invalid resource ID: {0}")]
    InvalidResourceId(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote API answered with an error status
    #[error("API error (status {status}, code {code}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// ARM error code (e.g. "ResourceNotFound")
        code: String,
        /// ARM error message
        message: String,
    },

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Operation deadline elapsed
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid resource ID error
    pub fn invalid_resource_id(msg: impl Into<String>) -> Self {
        Self::InvalidResourceId(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API error
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Wrap an error with the identifying context of the record it concerns
    pub fn remote(
        operation: Operation,
        name: impl Into<String>,
        zone: impl Into<String>,
        resource_group: impl Into<String>,
        source: Error,
    ) -> Self {
        Self::Remote {
            operation,
            name: name.into(),
            zone: zone.into(),
            resource_group: resource_group.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error (or the cause it wraps) is a timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Remote { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}
