//! Builds the run collaborators from a loaded config.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use secrecy::ExposeSecret;
use tracing::{info, warn};

use jobtrack::classifier::{Classifier, KeywordClassifier, OpenAiClassifier};
use jobtrack::config::{AuthMode, ClassifierKind, Config};
use jobtrack::email::{
    ClientCredentialsTokenProvider, DeviceCodeTokenProvider, DeviceFlowAuth, GraphMailSource,
    IdentityEndpoints, MailSource, TokenProvider,
};
use jobtrack::pipeline::Collaborators;
use jobtrack::report::CsvReportSink;
use jobtrack::store::CsvStore;

/// Set by most CI runners; forces app-only authentication.
const CI_ENV_VAR: &str = "CI";

/// Mailbox to read when app-only tokens are used and none is configured.
const MAILBOX_ENV_VAR: &str = "USER_EMAIL";

fn running_in_ci() -> bool {
    std::env::var(CI_ENV_VAR)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn unattended(config: &Config) -> bool {
    config.auth.mode == AuthMode::ClientCredentials || running_in_ci()
}

pub fn build_store(config: &Config) -> CsvStore {
    CsvStore::new(&config.storage.active_path, &config.storage.archive_path)
}

pub fn build_report_sink(config: &Config) -> CsvReportSink {
    CsvReportSink::new(&config.storage.report_directory)
}

fn build_token_provider(config: &Config) -> Result<Arc<dyn TokenProvider>> {
    let auth = &config.auth;
    let client_id = auth
        .client_id_source()
        .resolve()
        .context("OAuth client id is not configured")?
        .expose_secret()
        .to_string();
    let flow = DeviceFlowAuth::new(IdentityEndpoints::microsoft(&auth.tenant))?;

    if unattended(config) {
        info!("Using client credentials authentication");
        let secret = auth
            .client_secret_source()
            .resolve()
            .context("client credentials authentication needs a client secret")?;
        return Ok(Arc::new(ClientCredentialsTokenProvider::new(
            flow, client_id, secret,
        )));
    }

    let secret = auth
        .client_secret_source()
        .resolve_optional()
        .context("Failed to read client secret")?;
    Ok(Arc::new(DeviceCodeTokenProvider::new(
        flow,
        client_id,
        secret,
        auth.scopes.clone(),
        PathBuf::from(&auth.token_cache_path),
    )))
}

fn build_mail_source(config: &Config) -> Result<Arc<dyn MailSource>> {
    let mail = &config.mail;
    let mailbox = if unattended(config) {
        let mailbox = mail
            .mailbox
            .clone()
            .or_else(|| std::env::var(MAILBOX_ENV_VAR).ok())
            .filter(|m| !m.trim().is_empty());
        if mailbox.is_none() {
            bail!(
                "app-only tokens need a mailbox: set mail.mailbox or {}",
                MAILBOX_ENV_VAR
            );
        }
        mailbox
    } else {
        mail.mailbox.clone()
    };

    Ok(Arc::new(GraphMailSource::new(
        mail.graph_base_url.clone(),
        mailbox,
        mail.folder.clone(),
        mail.page_size,
        mail.max_pages,
    )?))
}

fn build_classifier(config: &Config) -> Result<Arc<dyn Classifier>> {
    let settings = &config.classifier;
    if settings.kind == ClassifierKind::Keywords {
        return Ok(Arc::new(KeywordClassifier::new()));
    }

    match settings
        .api_key_source()
        .resolve_optional()
        .context("Failed to read classifier API key")?
    {
        Some(key) => Ok(Arc::new(OpenAiClassifier::new(
            settings.endpoint.clone(),
            settings.model.clone(),
            key,
        )?)),
        None => {
            warn!("No classifier API key found, using keyword classification");
            Ok(Arc::new(KeywordClassifier::new()))
        }
    }
}

pub fn build_collaborators(config: &Config) -> Result<Collaborators> {
    Ok(Collaborators {
        tokens: build_token_provider(config)?,
        mail: build_mail_source(config)?,
        classifier: build_classifier(config)?,
        store: Arc::new(build_store(config)),
        reports: Arc::new(build_report_sink(config)),
    })
}
