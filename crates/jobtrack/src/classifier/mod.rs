//! Response-type classification of application emails.

pub mod keywords;
pub mod openai;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use keywords::KeywordClassifier;
pub use openai::{OpenAiClassifier, CLASSIFICATION_PROMPT};

/// Response type of an application thread.
///
/// Serialized with the exact labels written to storage. Parsing is
/// case-insensitive. Stored labels outside the known set are kept verbatim in
/// [`ResponseType::Unrecognized`] so a load/save cycle writes them back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResponseType {
    Applied,
    Rejected,
    Interview,
    Offer,
    NoReplyYet,
    Other,
    /// The classifier failed; stored as a normal row.
    Error,
    /// A stored label outside the known set, e.g. a legacy `Accepted`.
    Unrecognized(String),
}

impl ResponseType {
    pub const ALL: [ResponseType; 7] = [
        ResponseType::Applied,
        ResponseType::Rejected,
        ResponseType::Interview,
        ResponseType::Offer,
        ResponseType::NoReplyYet,
        ResponseType::Other,
        ResponseType::Error,
    ];

    pub fn label(&self) -> &str {
        match self {
            ResponseType::Applied => "Applied",
            ResponseType::Rejected => "Rejected",
            ResponseType::Interview => "Interview",
            ResponseType::Offer => "Offer",
            ResponseType::NoReplyYet => "No Reply Yet",
            ResponseType::Other => "Other",
            ResponseType::Error => "Error",
            ResponseType::Unrecognized(raw) => raw,
        }
    }

    /// Parses a model-produced label.
    ///
    /// Surrounding quotes and trailing punctuation are ignored, so a model
    /// answer such as `"Rejected."` still parses. Anything unrecognised
    /// becomes [`ResponseType::Other`].
    pub fn parse_label(label: &str) -> Self {
        Self::parse_known(label).unwrap_or(ResponseType::Other)
    }

    /// Parses a label read from storage.
    ///
    /// Unlike [`ResponseType::parse_label`], a non-empty unknown label is kept
    /// as [`ResponseType::Unrecognized`] with its original text.
    pub fn from_stored(label: &str) -> Self {
        let trimmed = label.trim();
        match Self::parse_known(trimmed) {
            Some(response) => response,
            None if trimmed.is_empty() => ResponseType::Other,
            None => ResponseType::Unrecognized(trimmed.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ResponseType::Unrecognized(_))
    }

    fn parse_known(label: &str) -> Option<Self> {
        let normalized = label
            .trim()
            .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
            .to_lowercase();

        let response = match normalized.as_str() {
            "applied" => ResponseType::Applied,
            "rejected" => ResponseType::Rejected,
            "interview" => ResponseType::Interview,
            "offer" => ResponseType::Offer,
            "no reply yet" | "no reply" => ResponseType::NoReplyYet,
            "other" => ResponseType::Other,
            "error" => ResponseType::Error,
            _ => return None,
        };
        Some(response)
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for ResponseType {
    fn from(label: String) -> Self {
        ResponseType::from_stored(&label)
    }
}

impl From<ResponseType> for String {
    fn from(response: ResponseType) -> Self {
        response.label().to_string()
    }
}

/// Failures of a remote classifier. Never escapes [`Classifier::classify`].
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid completion response: {0}")]
    InvalidResponse(String),

    #[error("Completion response contained no text")]
    EmptyResponse,
}

/// Labels a message with a response type.
///
/// Implementations never fail: provider errors yield [`ResponseType::Error`].
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, subject: &str, preview: &str) -> ResponseType;
}
