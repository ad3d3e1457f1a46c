//! Mail source and authentication error types.

use thiserror::Error;

/// Errors that can occur while authenticating against or fetching from the mail provider.
#[derive(Error, Debug)]
pub enum EmailError {
    /// Authentication failed. Fatal for a run.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Failed to retrieve credentials from the configured sources.
    #[error("Credentials not found: {0}")]
    CredentialsNotFound(String),

    /// OAuth2 token request or refresh failed.
    #[error("OAuth2 error: {0}")]
    OAuth2Error(String),

    /// Mail fetch failed. Recoverable: the pipeline treats it as an empty batch.
    #[error("Mail fetch failed: {0}")]
    FetchFailed(String),

    /// The provider answered with a payload we could not decode.
    #[error("Failed to parse provider response: {0}")]
    ParseError(String),

    /// IO error while reading or writing the token cache.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl EmailError {
    /// Returns true for errors that must abort a run.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            EmailError::AuthenticationFailed(_)
                | EmailError::CredentialsNotFound(_)
                | EmailError::OAuth2Error(_)
        )
    }
}

/// Result type for email operations.
pub type Result<T> = std::result::Result<T, EmailError>;
