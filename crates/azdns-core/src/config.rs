//! Configuration types for the reconciler
//!
//! This module defines all configuration structures used throughout the workspace.

use crate::timeouts::TimeoutsConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default Azure Resource Manager endpoint (public cloud)
pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://management.azure.com";

/// Default Azure AD authority (public cloud)
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// DNS management API version the record-set payloads are shaped for
pub const DEFAULT_DNS_API_VERSION: &str = "2018-05-01";

/// Main reconciler configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Azure connection settings
    pub azure: AzureConfig,

    /// Behavioural toggles
    #[serde(default)]
    pub features: FeaturesConfig,

    /// Per-operation timeout ceilings
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

impl ReconcilerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.azure.validate()?;
        self.timeouts.validate()?;
        Ok(())
    }
}

/// Azure connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    /// Subscription the DNS zones live in
    pub subscription_id: String,

    /// How requests are authenticated
    pub credential: CredentialConfig,

    /// Resource Manager base URL
    #[serde(default = "default_resource_manager_endpoint")]
    pub resource_manager_endpoint: String,

    /// Azure AD authority base URL
    #[serde(default = "default_authority")]
    pub authority: String,

    /// DNS API version
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl AzureConfig {
    /// Create a configuration for the public cloud
    pub fn new(subscription_id: impl Into<String>, credential: CredentialConfig) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            credential,
            resource_manager_endpoint: default_resource_manager_endpoint(),
            authority: default_authority(),
            api_version: default_api_version(),
        }
    }

    /// Point the client at a different Resource Manager endpoint
    pub fn with_resource_manager_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.resource_manager_endpoint = endpoint.into();
        self
    }

    /// Point token requests at a different authority
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    /// Validate the Azure configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.subscription_id.trim().is_empty() {
            return Err(crate::Error::config("Azure subscription ID cannot be empty"));
        }
        for (label, url) in [
            ("Resource Manager endpoint", &self.resource_manager_endpoint),
            ("authority", &self.authority),
        ] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(crate::Error::config(format!(
                    "Azure {} must use HTTP or HTTPS scheme. Got: {}",
                    label, url
                )));
            }
        }
        if self.api_version.is_empty() {
            return Err(crate::Error::config("DNS API version cannot be empty"));
        }
        self.credential.validate()
    }
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self::new(String::new(), CredentialConfig::AccessToken { token: String::new() })
    }
}

/// Credential configuration
///
/// The Debug implementation never prints secrets.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialConfig {
    /// A pre-acquired bearer token (e.g. from `az account get-access-token`)
    AccessToken {
        /// Bearer token
        token: String,
    },

    /// Service principal with a client secret (OAuth2 client credentials)
    ClientSecret {
        /// Azure AD tenant
        tenant_id: String,
        /// Application (client) ID
        client_id: String,
        /// Client secret
        client_secret: String,
    },
}

impl CredentialConfig {
    /// Validate the credential configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            CredentialConfig::AccessToken { token } => {
                if token.is_empty() {
                    return Err(crate::Error::config("Access token cannot be empty"));
                }
            }
            CredentialConfig::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => {
                if tenant_id.is_empty() {
                    return Err(crate::Error::config("Tenant ID cannot be empty"));
                }
                if client_id.is_empty() {
                    return Err(crate::Error::config("Client ID cannot be empty"));
                }
                if client_secret.is_empty() {
                    return Err(crate::Error::config("Client secret cannot be empty"));
                }
            }
        }
        Ok(())
    }

    /// Get the credential type name
    pub fn type_name(&self) -> &'static str {
        match self {
            CredentialConfig::AccessToken { .. } => "access_token",
            CredentialConfig::ClientSecret { .. } => "client_secret",
        }
    }
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialConfig::AccessToken { .. } => f
                .debug_struct("AccessToken")
                .field("token", &"<REDACTED>")
                .finish(),
            CredentialConfig::ClientSecret {
                tenant_id,
                client_id,
                ..
            } => f
                .debug_struct("ClientSecret")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .field("client_secret", &"<REDACTED>")
                .finish(),
        }
    }
}

/// Behavioural toggles
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Refuse to adopt a pre-existing remote record set when creating a new
    /// local entry
    #[serde(default = "default_import_existing_guard")]
    pub import_existing_guard: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            import_existing_guard: default_import_existing_guard(),
        }
    }
}

fn default_resource_manager_endpoint() -> String {
    DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string()
}

fn default_authority() -> String {
    DEFAULT_AUTHORITY.to_string()
}

fn default_api_version() -> String {
    DEFAULT_DNS_API_VERSION.to_string()
}

fn default_import_existing_guard() -> bool {
    true
}
