//! OAuth2 flows against the Microsoft identity platform.
//!
//! Implements the Device Authorization Grant (RFC 8628) for interactive use,
//! refresh-token renewal, and the client-credentials grant used in CI.

use log::{debug, info, warn};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::{EmailError, Result};

/// Maximum length for sanitized error bodies to prevent log flooding.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Scope requested by the client-credentials grant.
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Scopes the identity platform adds on its own; stripped from user config.
const RESERVED_SCOPES: &[&str] = &["offline_access", "openid", "profile"];

fn sanitize_oauth_error_body(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... (truncated)", &body[..cut])
    } else {
        body.to_string()
    }
}

/// Removes reserved OIDC scopes from a configured scope list.
pub fn filter_scopes(scopes: &[String]) -> Vec<String> {
    scopes
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && !RESERVED_SCOPES.contains(s))
        .map(str::to_string)
        .collect()
}

/// Device authorization and token endpoints for one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityEndpoints {
    pub device_auth_url: String,
    pub token_url: String,
}

impl IdentityEndpoints {
    /// Endpoints of the Microsoft identity platform (`common` supports personal + org accounts).
    pub fn microsoft(tenant: &str) -> Self {
        let base = format!("https://login.microsoftonline.com/{}/oauth2/v2.0", tenant);
        Self {
            device_auth_url: format!("{}/devicecode", base),
            token_url: format!("{}/token", base),
        }
    }
}

/// Response from the device authorization request.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCodeResponse {
    /// The device verification code.
    pub device_code: String,

    /// The end-user verification code to display to the user.
    pub user_code: String,

    /// The verification URI where the user should enter the user_code.
    pub verification_uri: String,

    /// Lifetime in seconds of the device_code and user_code.
    pub expires_in: u64,

    /// Minimum polling interval in seconds (default: 5).
    #[serde(default = "default_interval")]
    pub interval: u64,
}

fn default_interval() -> u64 {
    5
}

/// Response from the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub token_type: Option<String>,

    /// Lifetime in seconds of the access token.
    #[serde(default)]
    pub expires_in: Option<u64>,

    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Error response from the token endpoint during polling.
#[derive(Debug, Clone, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Default connect timeout for HTTP requests.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout for HTTP requests.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Floor for the device code lifetime, guarding against clock skew.
const MIN_POLL_TTL_SECS: u64 = 5;

pub(crate) fn create_http_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| EmailError::OAuth2Error(format!("Failed to create HTTP client: {}", e)))
}

/// OAuth2 flow handler bound to one set of identity endpoints.
pub struct DeviceFlowAuth {
    client: Client,
    endpoints: IdentityEndpoints,
}

impl DeviceFlowAuth {
    pub fn new(endpoints: IdentityEndpoints) -> Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            endpoints,
        })
    }

    /// Step 1: Request a device code from the authorization server.
    pub async fn request_device_code(
        &self,
        client_id: &str,
        scopes: &[String],
    ) -> Result<DeviceCodeResponse> {
        let mut scopes = filter_scopes(scopes);
        scopes.push("offline_access".to_string());
        let scope = scopes.join(" ");

        info!(
            "Requesting device code from {} for scopes: {}",
            self.endpoints.device_auth_url, scope
        );

        let params = [("client_id", client_id), ("scope", scope.as_str())];
        let response = self
            .client
            .post(&self.endpoints.device_auth_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                EmailError::OAuth2Error(format!("Failed to request device code: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::OAuth2Error(format!(
                "Device code request failed ({}): {}",
                status,
                sanitize_oauth_error_body(&body)
            )));
        }

        response
            .json()
            .await
            .map_err(|e| EmailError::OAuth2Error(format!("Failed to parse device code: {}", e)))
    }

    /// Step 2: Poll for the token after the user has authorized.
    pub async fn poll_for_token(
        &self,
        device_code: &DeviceCodeResponse,
        client_id: &str,
        client_secret: Option<&SecretString>,
    ) -> Result<TokenResponse> {
        let ttl_secs = device_code.expires_in.max(MIN_POLL_TTL_SECS);
        let deadline = std::time::Instant::now() + Duration::from_secs(ttl_secs);

        let min_interval = Duration::from_secs(1);
        let max_interval = Duration::from_secs(30);
        let mut interval = Duration::from_secs(device_code.interval).max(min_interval);

        const DEVICE_CODE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

        info!("Polling for token authorization (expires in {}s)", ttl_secs);

        loop {
            if std::time::Instant::now() > deadline {
                return Err(EmailError::AuthenticationFailed(
                    "Device code expired before authorization".to_string(),
                ));
            }

            tokio::time::sleep(interval).await;

            let mut params = vec![
                ("client_id", client_id.to_string()),
                ("device_code", device_code.device_code.clone()),
                ("grant_type", DEVICE_CODE_GRANT_TYPE.to_string()),
            ];
            if let Some(secret) = client_secret {
                params.push(("client_secret", secret.expose_secret().to_string()));
            }

            let response = self
                .client
                .post(&self.endpoints.token_url)
                .form(&params)
                .send()
                .await
                .map_err(|e| EmailError::OAuth2Error(format!("Token request failed: {}", e)))?;

            if response.status().is_success() {
                let token: TokenResponse = response.json().await.map_err(|e| {
                    EmailError::OAuth2Error(format!("Failed to parse token response: {}", e))
                })?;
                info!("Successfully obtained access token");
                return Ok(token);
            }

            let error: TokenErrorResponse = response.json().await.map_err(|e| {
                EmailError::OAuth2Error(format!("Failed to parse error response: {}", e))
            })?;

            match error.error.as_str() {
                "authorization_pending" => {
                    debug!("Authorization pending, continuing to poll...");
                }
                "slow_down" => {
                    // RFC 8628 section 3.5
                    interval = (interval + Duration::from_secs(5)).min(max_interval);
                    warn!("Server requested slow down, new interval: {:?}", interval);
                }
                "expired_token" => {
                    return Err(EmailError::AuthenticationFailed(
                        "Device code expired before authorization".to_string(),
                    ));
                }
                "access_denied" => {
                    return Err(EmailError::AuthenticationFailed(
                        "User denied the authorization request".to_string(),
                    ));
                }
                _ => {
                    return Err(EmailError::AuthenticationFailed(format!(
                        "Token request error: {} - {}",
                        error.error,
                        error.error_description.unwrap_or_default()
                    )));
                }
            }
        }
    }

    /// Refresh an access token using a refresh token.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &SecretString,
        client_id: &str,
        scopes: &[String],
    ) -> Result<TokenResponse> {
        info!("Refreshing access token");

        let scope = filter_scopes(scopes).join(" ");
        let params = [
            ("client_id", client_id),
            ("refresh_token", refresh_token.expose_secret()),
            ("grant_type", "refresh_token"),
            ("scope", scope.as_str()),
        ];

        self.token_request(&params, "Token refresh").await
    }

    /// Client-credentials grant for unattended runs.
    pub async fn request_client_credentials_token(
        &self,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<TokenResponse> {
        info!("Requesting app-only token via client credentials");

        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret.expose_secret()),
            ("grant_type", "client_credentials"),
            ("scope", GRAPH_DEFAULT_SCOPE),
        ];

        self.token_request(&params, "Client credentials").await
    }

    async fn token_request(&self, params: &[(&str, &str)], what: &str) -> Result<TokenResponse> {
        let response = self
            .client
            .post(&self.endpoints.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| EmailError::OAuth2Error(format!("{} request failed: {}", what, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::OAuth2Error(format!(
                "{} failed ({}): {}",
                what,
                status,
                sanitize_oauth_error_body(&body)
            )));
        }

        response.json().await.map_err(|e| {
            EmailError::OAuth2Error(format!("Failed to parse {} response: {}", what, e))
        })
    }

    pub fn endpoints(&self) -> &IdentityEndpoints {
        &self.endpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_microsoft_endpoints() {
        let endpoints = IdentityEndpoints::microsoft("common");
        assert_eq!(
            endpoints.device_auth_url,
            "https://login.microsoftonline.com/common/oauth2/v2.0/devicecode"
        );
        assert_eq!(
            endpoints.token_url,
            "https://login.microsoftonline.com/common/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_filter_scopes_strips_reserved() {
        let scopes = vec![
            "Mail.Read".to_string(),
            "offline_access".to_string(),
            "openid".to_string(),
            " profile ".to_string(),
            "".to_string(),
        ];
        assert_eq!(filter_scopes(&scopes), vec!["Mail.Read".to_string()]);
    }

    #[test]
    fn test_sanitize_oauth_error_body() {
        assert_eq!(sanitize_oauth_error_body("short"), "short");
        let long = "x".repeat(500);
        let sanitized = sanitize_oauth_error_body(&long);
        assert!(sanitized.ends_with("... (truncated)"));
        assert!(sanitized.len() < 250);
    }

    #[test]
    fn test_device_code_response_default_interval() {
        let json = r#"{
            "device_code": "dc",
            "user_code": "ABCD-EFGH",
            "verification_uri": "https://microsoft.com/devicelogin",
            "expires_in": 900
        }"#;
        let parsed: DeviceCodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.interval, 5);
        assert_eq!(parsed.user_code, "ABCD-EFGH");
    }

    #[test]
    fn test_device_flow_auth_creation() {
        let auth = DeviceFlowAuth::new(IdentityEndpoints::microsoft("consumers")).unwrap();
        assert!(auth.endpoints().token_url.contains("/consumers/"));
    }
}
