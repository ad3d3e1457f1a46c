use serde::{Deserialize, Serialize};

use crate::secrets::SecretSource;
use crate::tracking::{DEFAULT_LOOKBACK_DAYS, DEFAULT_STALE_AFTER_DAYS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            storage: StorageConfig::default(),
            tracking: TrackingConfig::default(),
            mail: MailConfig::default(),
            auth: AuthConfig::default(),
            classifier: ClassifierConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

/// File locations. Relative paths resolve against the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_active_path")]
    pub active_path: String,
    #[serde(default = "default_archive_path")]
    pub archive_path: String,
    #[serde(default = "default_watermark_path")]
    pub watermark_path: String,
    #[serde(default = "default_report_directory")]
    pub report_directory: String,
}

fn default_active_path() -> String {
    "job_applications.csv".to_string()
}

fn default_archive_path() -> String {
    "job_applications_archived.csv".to_string()
}

fn default_watermark_path() -> String {
    "last_run.json".to_string()
}

fn default_report_directory() -> String {
    "reports".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            active_path: default_active_path(),
            archive_path: default_archive_path(),
            watermark_path: default_watermark_path(),
            report_directory: default_report_directory(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Fetch window when neither a watermark nor stored dates exist.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: u32,
}

fn default_lookback_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

fn default_stale_after_days() -> u32 {
    DEFAULT_STALE_AFTER_DAYS
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            stale_after_days: DEFAULT_STALE_AFTER_DAYS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
    #[serde(default = "default_folder")]
    pub folder: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Mailbox to read with app-only tokens; `/me` is used when unset.
    #[serde(default)]
    pub mailbox: Option<String>,
}

fn default_graph_base_url() -> String {
    "https://graph.microsoft.com/v1.0".to_string()
}

fn default_folder() -> String {
    "inbox".to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_max_pages() -> u32 {
    20
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            graph_base_url: default_graph_base_url(),
            folder: default_folder(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            mailbox: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AuthMode {
    /// Interactive device code login with a cached token.
    #[default]
    DeviceCode,
    /// App-only token for unattended runs.
    ClientCredentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
    #[serde(default = "default_tenant")]
    pub tenant: String,

    /// Inline client id. Prefer `clientIdEnvVar` or `clientIdFile`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id_file: Option<String>,
    #[serde(default = "default_client_id_env_var")]
    pub client_id_env_var: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret_file: Option<String>,
    #[serde(default = "default_client_secret_env_var")]
    pub client_secret_env_var: Option<String>,

    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_token_cache_path", alias = "token_cache_path")]
    pub token_cache_path: String,
}

fn default_tenant() -> String {
    "common".to_string()
}

fn default_client_id_env_var() -> Option<String> {
    Some("CLIENT_ID".to_string())
}

fn default_client_secret_env_var() -> Option<String> {
    Some("CLIENT_SECRET".to_string())
}

fn default_scopes() -> Vec<String> {
    vec!["Mail.Read".to_string()]
}

fn default_token_cache_path() -> String {
    "tokens.json".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            tenant: default_tenant(),
            client_id: None,
            client_id_file: None,
            client_id_env_var: default_client_id_env_var(),
            client_secret_file: None,
            client_secret_env_var: default_client_secret_env_var(),
            scopes: default_scopes(),
            token_cache_path: default_token_cache_path(),
        }
    }
}

impl AuthConfig {
    pub fn client_id_source(&self) -> SecretSource {
        SecretSource {
            value: self.client_id.clone(),
            file: self.client_id_file.clone(),
            env_var: self.client_id_env_var.clone(),
        }
    }

    pub fn client_secret_source(&self) -> SecretSource {
        SecretSource {
            value: None,
            file: self.client_secret_file.clone(),
            env_var: self.client_secret_env_var.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Chat completions; falls back to keywords when no API key resolves.
    #[default]
    OpenAi,
    Keywords,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    #[serde(default)]
    pub kind: ClassifierKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env_var")]
    pub api_key_env_var: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_api_key_env_var() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::default(),
            api_key_file: None,
            api_key_env_var: default_api_key_env_var(),
            model: default_model(),
            endpoint: default_endpoint(),
        }
    }
}

impl ClassifierConfig {
    pub fn api_key_source(&self) -> SecretSource {
        SecretSource {
            value: None,
            file: self.api_key_file.clone(),
            env_var: self.api_key_env_var.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Extra hiring-platform domains, added to the built-in list.
    #[serde(default)]
    pub platform_domains: Vec<String>,
    /// Extra title rules, evaluated after the built-in ones.
    #[serde(default)]
    pub title_patterns: Vec<TitlePattern>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitlePattern {
    pub pattern: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_max_tokens() -> usize {
    crate::extractor::DEFAULT_MAX_TOKENS
}
