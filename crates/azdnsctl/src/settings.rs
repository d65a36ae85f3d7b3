//! Connection and behaviour settings
//!
//! Every setting can be given as a flag or through the environment. Flags win.

use anyhow::{Result, bail};
use azdns_core::config::{
    AzureConfig, CredentialConfig, DEFAULT_RESOURCE_MANAGER_ENDPOINT, FeaturesConfig,
    ReconcilerConfig,
};
use azdns_core::TimeoutsConfig;
use clap::Args;
use clap::builder::BoolishValueParser;
use tracing::Level;

#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Subscription containing the DNS zone
    #[arg(long, global = true, env = "ARM_SUBSCRIPTION_ID")]
    pub subscription_id: Option<String>,

    /// Azure AD tenant of the service principal
    #[arg(long, global = true, env = "ARM_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// Service principal application ID
    #[arg(long, global = true, env = "ARM_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Service principal secret
    #[arg(long, global = true, env = "ARM_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Pre-acquired bearer token; takes precedence over the service principal
    #[arg(long, global = true, env = "ARM_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Resource Manager endpoint
    #[arg(long, global = true, env = "ARM_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Refuse to adopt record sets that already exist when creating
    #[arg(
        long,
        global = true,
        env = "AZDNS_IMPORT_GUARD",
        value_parser = BoolishValueParser::new()
    )]
    pub import_guard: Option<bool>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AZDNS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, global = true, env = "AZDNS_TIMEOUT_CREATE_SECS")]
    pub timeout_create_secs: Option<u64>,

    #[arg(long, global = true, env = "AZDNS_TIMEOUT_READ_SECS")]
    pub timeout_read_secs: Option<u64>,

    #[arg(long, global = true, env = "AZDNS_TIMEOUT_UPDATE_SECS")]
    pub timeout_update_secs: Option<u64>,

    #[arg(long, global = true, env = "AZDNS_TIMEOUT_DELETE_SECS")]
    pub timeout_delete_secs: Option<u64>,
}

impl SettingsArgs {
    /// Parse the configured log level
    pub fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => bail!(
                "AZDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Build and validate the reconciler configuration
    pub fn reconciler_config(&self) -> Result<ReconcilerConfig> {
        let Some(subscription_id) = non_empty(&self.subscription_id) else {
            bail!(
                "ARM_SUBSCRIPTION_ID is required. \
                Set it via: export ARM_SUBSCRIPTION_ID=<subscription-guid>"
            );
        };

        let mut azure = AzureConfig::new(subscription_id, self.credential()?);
        if let Some(endpoint) = non_empty(&self.endpoint) {
            azure = azure.with_resource_manager_endpoint(endpoint);
        }

        let mut timeouts = TimeoutsConfig::default();
        if let Some(secs) = self.timeout_create_secs {
            timeouts.create_secs = secs;
        }
        if let Some(secs) = self.timeout_read_secs {
            timeouts.read_secs = secs;
        }
        if let Some(secs) = self.timeout_update_secs {
            timeouts.update_secs = secs;
        }
        if let Some(secs) = self.timeout_delete_secs {
            timeouts.delete_secs = secs;
        }

        let mut features = FeaturesConfig::default();
        if let Some(guard) = self.import_guard {
            features.import_existing_guard = guard;
        }

        let config = ReconcilerConfig {
            azure,
            features,
            timeouts,
        };
        config.validate()?;
        Ok(config)
    }

    fn credential(&self) -> Result<CredentialConfig> {
        if let Some(token) = non_empty(&self.access_token) {
            return Ok(CredentialConfig::AccessToken {
                token: token.to_string(),
            });
        }

        match (
            non_empty(&self.tenant_id),
            non_empty(&self.client_id),
            non_empty(&self.client_secret),
        ) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => {
                Ok(CredentialConfig::ClientSecret {
                    tenant_id: tenant_id.to_string(),
                    client_id: client_id.to_string(),
                    client_secret: client_secret.to_string(),
                })
            }
            (None, None, None) => bail!(
                "No Azure credentials configured. Set ARM_ACCESS_TOKEN, or \
                ARM_TENANT_ID, ARM_CLIENT_ID and ARM_CLIENT_SECRET"
            ),
            _ => bail!(
                "Incomplete service principal: ARM_TENANT_ID, ARM_CLIENT_ID and \
                ARM_CLIENT_SECRET must all be set"
            ),
        }
    }

    /// Endpoint actually in use, for logging
    pub fn effective_endpoint(&self) -> &str {
        non_empty(&self.endpoint).unwrap_or(DEFAULT_RESOURCE_MANAGER_ENDPOINT)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
