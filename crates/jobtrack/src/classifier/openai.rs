//! Chat-completions classifier for OpenAI-compatible endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Classifier, ClassifierError, ResponseType};

/// Labelling prompt; `{subject}` and `{preview}` are substituted per message.
pub const CLASSIFICATION_PROMPT: &str = r#"
You are an assistant helping someone track job applications.

Given the following email:
Subject: "{subject}"
Preview: "{preview}"

What type of response is this? Choose only one of:
- Applied
- Rejected
- Interview
- Offer
- No Reply Yet
- Other

Respond with only the label, nothing else.
"#;

const MAX_TOKENS: u32 = 5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Fills both placeholders in one pass over the template, so placeholder
/// text inside `subject` or `preview` is left as-is.
pub fn build_prompt(subject: &str, preview: &str) -> String {
    let placeholders = [("{subject}", subject), ("{preview}", preview)];
    let mut prompt =
        String::with_capacity(CLASSIFICATION_PROMPT.len() + subject.len() + preview.len());
    let mut rest = CLASSIFICATION_PROMPT;

    while let Some(start) = rest.find('{') {
        prompt.push_str(&rest[..start]);
        let tail = &rest[start..];
        match placeholders
            .iter()
            .find(|(placeholder, _)| tail.starts_with(placeholder))
        {
            Some((placeholder, value)) => {
                prompt.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                prompt.push('{');
                rest = &tail[1..];
            }
        }
    }
    prompt.push_str(rest);
    prompt
}

/// Extracts the first choice's text from a chat-completions response body.
pub fn parse_completion(body: &str) -> Result<String, ClassifierError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(ClassifierError::EmptyResponse)
}

pub struct OpenAiClassifier {
    client: Client,
    endpoint: String,
    model: String,
    api_key: SecretString,
}

impl OpenAiClassifier {
    pub fn new(endpoint: String, model: String, api_key: SecretString) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClassifierError::Http(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            model,
            api_key,
        })
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    async fn complete(&self, prompt: &str) -> Result<String, ClassifierError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": 0
        });

        let resp = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifierError::Http(format!("Completion request failed: {}", e)))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ClassifierError::Http(format!("Failed to read completion: {}", e)))?;

        if !status.is_success() {
            return Err(ClassifierError::Http(format!("Completion endpoint returned {}", status)));
        }

        parse_completion(&text)
    }
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    async fn classify(&self, subject: &str, preview: &str) -> ResponseType {
        match self.complete(&build_prompt(subject, preview)).await {
            Ok(label) => {
                debug!(label = %label, "Model classification");
                ResponseType::parse_label(&label)
            }
            Err(e) => {
                warn!("Classification failed, storing as Error: {}", e);
                ResponseType::Error
            }
        }
    }
}
