//! Bearer token acquisition for the mail provider.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::device_auth::{DeviceFlowAuth, TokenResponse};
use crate::sanitize;
use super::error::{EmailError, Result};

/// Seconds before expiry at which a cached token is considered stale.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Produces a bearer credential for the mail provider.
///
/// Failures are authentication errors and abort the run.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn acquire(&self) -> Result<SecretString>;
}

/// Token cache file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) at which the access token expires.
    #[serde(default)]
    pub expires_on: Option<i64>,
}

impl CachedToken {
    pub fn from_response(response: &TokenResponse, now_ts: i64) -> Self {
        let lifetime = response.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS) as i64;
        Self {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
            expires_on: Some(now_ts + lifetime),
        }
    }

    /// A token without an expiry is never trusted.
    pub fn is_valid_at(&self, now_ts: i64) -> bool {
        match self.expires_on {
            Some(expiry) => now_ts < expiry - EXPIRY_SKEW_SECS,
            None => false,
        }
    }

    pub fn load(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Ignoring unreadable token cache {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EmailError::ConfigError(format!("Failed to encode token cache: {}", e)))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Interactive device-code login with a file-backed token cache.
pub struct DeviceCodeTokenProvider {
    auth: DeviceFlowAuth,
    client_id: String,
    client_secret: Option<SecretString>,
    scopes: Vec<String>,
    cache_path: PathBuf,
}

impl DeviceCodeTokenProvider {
    pub fn new(
        auth: DeviceFlowAuth,
        client_id: String,
        client_secret: Option<SecretString>,
        scopes: Vec<String>,
        cache_path: PathBuf,
    ) -> Self {
        Self {
            auth,
            client_id,
            client_secret,
            scopes,
            cache_path,
        }
    }

    async fn device_login(&self) -> Result<TokenResponse> {
        let code = self
            .auth
            .request_device_code(&self.client_id, &self.scopes)
            .await?;

        info!(
            "DEVICE LOGIN REQUIRED: visit {} and enter the code {}",
            code.verification_uri, code.user_code
        );

        self.auth
            .poll_for_token(&code, &self.client_id, self.client_secret.as_ref())
            .await
    }

    fn reset_cache(&self) {
        if self.cache_path.exists() {
            match std::fs::remove_file(&self.cache_path) {
                Ok(()) => info!(
                    "Deleted token cache {}",
                    sanitize::redact_path(&self.cache_path)
                ),
                Err(e) => warn!(
                    "Failed to delete token cache {}: {}",
                    sanitize::redact_path(&self.cache_path),
                    e
                ),
            }
        }
    }

    fn store(&self, response: &TokenResponse) -> SecretString {
        let cached = CachedToken::from_response(response, Utc::now().timestamp());
        if let Err(e) = cached.save(&self.cache_path) {
            warn!("Failed to write token cache: {}", e);
        }
        SecretString::from(response.access_token.clone())
    }
}

#[async_trait]
impl TokenProvider for DeviceCodeTokenProvider {
    async fn acquire(&self) -> Result<SecretString> {
        let now_ts = Utc::now().timestamp();

        if let Some(cached) = CachedToken::load(&self.cache_path) {
            if cached.is_valid_at(now_ts) {
                debug!("Reusing cached access token");
                return Ok(SecretString::from(cached.access_token));
            }

            if let Some(refresh) = cached.refresh_token {
                info!("Cached token expired, refreshing");
                match self
                    .auth
                    .refresh_access_token(&SecretString::from(refresh), &self.client_id, &self.scopes)
                    .await
                {
                    Ok(response) => return Ok(self.store(&response)),
                    Err(e) => warn!("Token refresh failed, falling back to device login: {}", e),
                }
            } else {
                info!("Cached token expired, re-authenticating");
            }
        }

        match self.device_login().await {
            Ok(response) => Ok(self.store(&response)),
            Err(e) => {
                self.reset_cache();
                Err(EmailError::AuthenticationFailed(e.to_string()))
            }
        }
    }
}

/// App-only credentials for unattended (CI) runs. Tokens are not cached.
pub struct ClientCredentialsTokenProvider {
    auth: DeviceFlowAuth,
    client_id: String,
    client_secret: SecretString,
}

impl ClientCredentialsTokenProvider {
    pub fn new(auth: DeviceFlowAuth, client_id: String, client_secret: SecretString) -> Self {
        Self {
            auth,
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsTokenProvider {
    async fn acquire(&self) -> Result<SecretString> {
        self.auth
            .request_client_credentials_token(&self.client_id, &self.client_secret)
            .await
            .map(|response| SecretString::from(response.access_token))
            .map_err(|e| EmailError::AuthenticationFailed(e.to_string()))
    }
}
