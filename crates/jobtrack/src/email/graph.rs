//! Microsoft Graph inbox source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::device_auth::create_http_client;
use super::error::{EmailError, Result};
use super::message::RawMessage;

/// Fields requested from Graph for every message.
const SELECT_FIELDS: &str = "subject,bodyPreview,receivedDateTime,from";

/// Yields raw inbox messages received at or after `since`.
///
/// Failures are recoverable: the pipeline logs them and continues with an
/// empty batch.
#[async_trait]
pub trait MailSource: Send + Sync {
    async fn fetch(&self, token: &SecretString, since: DateTime<Utc>) -> Result<Vec<RawMessage>>;
}

#[derive(Debug, Deserialize)]
struct MessagePage {
    #[serde(default)]
    value: Vec<GraphMessage>,
    #[serde(rename = "@odata.nextLink", default)]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphMessage {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    body_preview: Option<String>,
    #[serde(default)]
    received_date_time: Option<String>,
    #[serde(default)]
    from: Option<GraphRecipient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphRecipient {
    #[serde(default)]
    email_address: Option<GraphEmailAddress>,
}

#[derive(Debug, Deserialize)]
struct GraphEmailAddress {
    #[serde(default)]
    address: Option<String>,
}

impl From<GraphMessage> for RawMessage {
    fn from(msg: GraphMessage) -> Self {
        let sender = msg
            .from
            .and_then(|f| f.email_address)
            .and_then(|e| e.address)
            .unwrap_or_default();
        RawMessage {
            sender,
            subject: msg.subject.unwrap_or_default(),
            preview: msg.body_preview.unwrap_or_default(),
            received_at: msg.received_date_time.unwrap_or_default(),
        }
    }
}

/// Decodes one Graph page into raw messages and the next page link.
pub fn parse_page(body: &str) -> Result<(Vec<RawMessage>, Option<String>)> {
    let page: MessagePage =
        serde_json::from_str(body).map_err(|e| EmailError::ParseError(e.to_string()))?;
    let messages = page.value.into_iter().map(RawMessage::from).collect();
    Ok((messages, page.next_link))
}

/// Formats the Graph `$filter` lower bound.
pub fn since_filter(since: DateTime<Utc>) -> String {
    format!(
        "receivedDateTime ge {}",
        since.format("%Y-%m-%dT%H:%M:%SZ")
    )
}

/// Inbox reader over the Graph REST API with `@odata.nextLink` pagination.
pub struct GraphMailSource {
    client: Client,
    base_url: String,
    mailbox: Option<String>,
    folder: String,
    page_size: u32,
    max_pages: u32,
}

impl GraphMailSource {
    pub fn new(
        base_url: String,
        mailbox: Option<String>,
        folder: String,
        page_size: u32,
        max_pages: u32,
    ) -> Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            base_url,
            mailbox,
            folder,
            page_size,
            max_pages,
        })
    }

    /// `/users/{mailbox}` for app-only tokens, `/me` for delegated ones.
    pub fn messages_url(&self) -> String {
        let owner = match &self.mailbox {
            Some(mailbox) => format!("users/{}", mailbox),
            None => "me".to_string(),
        };
        format!(
            "{}/{}/mailFolders/{}/messages",
            self.base_url.trim_end_matches('/'),
            owner,
            self.folder
        )
    }

    async fn get_page(&self, token: &SecretString, request: reqwest::RequestBuilder) -> Result<String> {
        let response = request
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| EmailError::FetchFailed(format!("Graph request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EmailError::FetchFailed(format!("Failed to read Graph response: {}", e)))?;

        if !status.is_success() {
            return Err(EmailError::FetchFailed(format!(
                "Graph returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl MailSource for GraphMailSource {
    async fn fetch(&self, token: &SecretString, since: DateTime<Utc>) -> Result<Vec<RawMessage>> {
        let first = self.client.get(self.messages_url()).query(&[
            ("$filter", since_filter(since)),
            ("$top", self.page_size.to_string()),
            ("$select", SELECT_FIELDS.to_string()),
        ]);

        let mut messages = Vec::new();
        let mut body = self.get_page(token, first).await?;
        let mut pages = 1;

        loop {
            let (batch, next_link) = parse_page(&body)?;
            debug!("Graph page {} returned {} messages", pages, batch.len());
            messages.extend(batch);

            match next_link {
                Some(link) if pages < self.max_pages => {
                    body = self.get_page(token, self.client.get(link)).await?;
                    pages += 1;
                }
                Some(_) => {
                    info!("Stopping after {} pages (max_pages reached)", pages);
                    break;
                }
                None => break,
            }
        }

        info!("Fetched {} messages from {}", messages.len(), self.folder);
        Ok(messages)
    }
}
