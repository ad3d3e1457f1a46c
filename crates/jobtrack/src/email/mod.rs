//! Inbox access: authentication, fetching, eligibility and deduplication.
//!
//! Messages are read from Microsoft Graph with a bearer token obtained either
//! interactively (device code flow, cached on disk) or via client credentials
//! for unattended runs.

pub mod dedupe;
pub mod device_auth;
pub mod error;
pub mod graph;
pub mod message;
pub mod token;

pub use dedupe::dedupe_latest_per_sender;
pub use device_auth::{DeviceCodeResponse, DeviceFlowAuth, IdentityEndpoints, TokenResponse};
pub use error::EmailError;
pub use graph::{GraphMailSource, MailSource};
pub use message::{EligibleMessage, RawMessage};
pub use token::{CachedToken, ClientCredentialsTokenProvider, DeviceCodeTokenProvider, TokenProvider};
