//! Bearer token acquisition for the Resource Manager
//!
//! Two credential kinds are supported:
//! - a static access token supplied by the operator
//! - a service principal secret, exchanged for a token with the OAuth2
//!   client-credentials grant against Azure AD
//!
//! Tokens obtained from Azure AD are cached until shortly before they expire.

use azdns_core::config::CredentialConfig;
use azdns_core::{Error, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::fmt;
use tokio::sync::Mutex;

/// Refresh tokens this long before they expire
const REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Longest lifetime trusted from the token endpoint
const MAX_TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Source of bearer tokens
pub enum TokenCredential {
    /// Pre-acquired token, used as-is
    Static(String),

    /// Service principal secret exchanged at `token_url`
    ClientSecret {
        token_url: String,
        client_id: String,
        client_secret: String,
        scope: String,
        cache: Mutex<Option<CachedToken>>,
    },
}

/// A token and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + ChronoDuration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenCredential {
    /// Build a credential from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Credential settings
    /// - `authority`: Azure AD base URL
    /// - `resource_manager_endpoint`: Audience the token is requested for
    pub fn from_config(
        config: &CredentialConfig,
        authority: &str,
        resource_manager_endpoint: &str,
    ) -> Self {
        match config {
            CredentialConfig::AccessToken { token } => TokenCredential::Static(token.clone()),
            CredentialConfig::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => TokenCredential::ClientSecret {
                token_url: format!(
                    "{}/{}/oauth2/v2.0/token",
                    authority.trim_end_matches('/'),
                    tenant_id
                ),
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                scope: format!("{}/.default", resource_manager_endpoint.trim_end_matches('/')),
                cache: Mutex::new(None),
            },
        }
    }

    /// Get a bearer token, requesting a new one if needed
    pub async fn token(&self, client: &reqwest::Client) -> Result<String> {
        match self {
            TokenCredential::Static(token) => Ok(token.clone()),
            TokenCredential::ClientSecret {
                token_url,
                client_id,
                client_secret,
                scope,
                cache,
            } => {
                let mut cached = cache.lock().await;
                if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
                    return Ok(token.access_token.clone());
                }

                tracing::debug!("Requesting Azure AD token for client {}", client_id);
                let fresh =
                    request_token(client, token_url, client_id, client_secret, scope).await?;
                let access_token = fresh.access_token.clone();
                *cached = Some(fresh);
                Ok(access_token)
            }
        }
    }
}

async fn request_token(
    client: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    scope: &str,
) -> Result<CachedToken> {
    let response = client
        .post(token_url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("scope", scope),
        ])
        .send()
        .await
        .map_err(|e| Error::http(format!("Token request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::http(format!("Failed to read token response: {}", e)))?;

    if !status.is_success() {
        let reason = serde_json::from_str::<TokenErrorResponse>(&body)
            .map(|e| match e.error_description {
                Some(description) => format!("{}: {}", e.error, description),
                None => e.error,
            })
            .unwrap_or_else(|_| format!("status {}", status));
        return Err(Error::auth(format!("Azure AD rejected the token request ({})", reason)));
    }

    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| Error::auth(format!("Invalid token response: {}", e)))?;

    let expires_at = expiry_after(Utc::now(), token.expires_in)?;
    Ok(CachedToken {
        access_token: token.access_token,
        expires_at,
    })
}

/// Expiry instant for a token issued at `now` with the given `expires_in`
fn expiry_after(now: DateTime<Utc>, expires_in: Option<i64>) -> Result<DateTime<Utc>> {
    let lifetime = expires_in
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
        .clamp(0, MAX_TOKEN_LIFETIME_SECS);

    ChronoDuration::try_seconds(lifetime)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| Error::auth(format!("Token lifetime of {}s is out of range", lifetime)))
}

// Custom Debug implementation that hides secrets and tokens
impl fmt::Debug for TokenCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenCredential::Static(_) => f.debug_tuple("Static").field(&"<REDACTED>").finish(),
            TokenCredential::ClientSecret {
                token_url,
                client_id,
                scope,
                ..
            } => f
                .debug_struct("ClientSecret")
                .field("token_url", token_url)
                .field("client_id", client_id)
                .field("client_secret", &"<REDACTED>")
                .field("scope", scope)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_secret_credential_targets_tenant_and_audience() {
        let config = CredentialConfig::ClientSecret {
            tenant_id: "contoso".to_string(),
            client_id: "app".to_string(),
            client_secret: "shh".to_string(),
        };
        let credential = TokenCredential::from_config(
            &config,
            "https://login.microsoftonline.com/",
            "https://management.azure.com/",
        );

        match credential {
            TokenCredential::ClientSecret {
                token_url, scope, ..
            } => {
                assert_eq!(
                    token_url,
                    "https://login.microsoftonline.com/contoso/oauth2/v2.0/token"
                );
                assert_eq!(scope, "https://management.azure.com/.default");
            }
            TokenCredential::Static(_) => panic!("expected client secret credential"),
        }
    }

    #[test]
    fn cached_token_refreshes_before_expiry() {
        let now = Utc::now();
        let fresh = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + ChronoDuration::minutes(30),
        };
        let stale = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + ChronoDuration::minutes(2),
        };
        assert!(fresh.is_fresh(now));
        assert!(!stale.is_fresh(now));
    }

    #[test]
    fn token_lifetime_is_clamped() {
        let now = Utc::now();

        let huge = expiry_after(now, Some(i64::MAX)).unwrap();
        assert_eq!(huge, now + ChronoDuration::hours(24));

        let negative = expiry_after(now, Some(-30)).unwrap();
        assert_eq!(negative, now);

        let missing = expiry_after(now, None).unwrap();
        assert_eq!(missing, now + ChronoDuration::hours(1));

        let normal = expiry_after(now, Some(3599)).unwrap();
        assert_eq!(normal, now + ChronoDuration::seconds(3599));
    }

    #[tokio::test]
    async fn static_token_is_returned_as_is() {
        let credential = TokenCredential::Static("abc".to_string());
        let token = credential.token(&reqwest::Client::new()).await.unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn debug_hides_secrets() {
        let credential = TokenCredential::from_config(
            &CredentialConfig::ClientSecret {
                tenant_id: "contoso".to_string(),
                client_id: "app".to_string(),
                client_secret: "very_secret_value".to_string(),
            },
            "https://login.microsoftonline.com",
            "https://management.azure.com",
        );
        let debug_str = format!("{:?}", credential);
        assert!(!debug_str.contains("very_secret_value"));

        let debug_str = format!("{:?}", TokenCredential::Static("bearer_value".to_string()));
        assert!(!debug_str.contains("bearer_value"));
    }
}
