//! Job title extraction via an ordered list of capture rules.

use std::sync::LazyLock;

use regex::Regex;

use super::{clean_capture, title_case};

/// Default token limit for a captured title.
pub const DEFAULT_MAX_TOKENS: usize = 8;

/// One extraction rule: the first capture group is the title candidate.
#[derive(Debug, Clone)]
pub struct TitleRule {
    pattern: Regex,
    max_tokens: usize,
}

impl TitleRule {
    pub fn new(pattern: &str, max_tokens: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            max_tokens,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Number of explicit capture groups.
    pub fn capture_groups(&self) -> usize {
        self.pattern.captures_len() - 1
    }

    /// Returns the cleaned capture if it fits within the token limit.
    pub fn capture(&self, text: &str) -> Option<String> {
        let caps = self.pattern.captures(text)?;
        let candidate = clean_capture(caps.get(1)?.as_str());
        let tokens = candidate.split_whitespace().count();
        if tokens == 0 || tokens > self.max_tokens {
            return None;
        }
        Some(candidate)
    }
}

/// Built-in patterns, most specific first.
const BUILTIN_PATTERNS: &[&str] = &[
    r"(?i)\bapplying\s+(?:for|to)\s+(?:the\s+)?([^,.;!?|\n]+?)\s+(?:position|role|job)\b",
    r"(?i)\bapplication\s+(?:for|to)\s+(?:the\s+)?([^,.;!?|\n]+?)\s+(?:position|role|job)\b",
    r"(?i)\bfor\s+the\s+([^,.;!?|\n]+?)\s+(?:position|role|job)\b",
    r"(?i)\b(?:position|role|job\s+title)\s*:\s*([^\n]+?)(?:[,.;!|]|\s+-\s|\n|$)",
    r"(?i)\binvitation\s+to\s+(?:an?\s+)?([^,.;!?|\n]+?)\s+interview\b",
    r"(?i)\binterview\s+for\s+(?:the\s+)?([^\n]+?)(?:\s+(?:position|role|job)\b|[,.;!|]|\s+-\s|\s+at\s|\n|$)",
    r"מועמדות\s+למשרת\s*:?\s*([^\n]+?)(?:[,.;!|]|\s+-\s|\n|$)",
    r"(?i)\byour\s+application\s+for\s+(?:the\s+)?([^\n]+?)(?:[,.;!|]|\s+-\s|\s+at\s|\s+with\s|\n|$)",
];

static BUILTIN_RULES: LazyLock<Vec<TitleRule>> = LazyLock::new(|| {
    BUILTIN_PATTERNS
        .iter()
        .map(|p| TitleRule::new(p, DEFAULT_MAX_TOKENS).unwrap())
        .collect()
});

/// The built-in rule list, in evaluation order.
pub fn builtin_title_rules() -> Vec<TitleRule> {
    BUILTIN_RULES.clone()
}

/// First qualifying capture across `rules`, title-cased.
pub fn extract_job_title(text: &str, rules: &[TitleRule]) -> Option<String> {
    rules
        .iter()
        .find_map(|rule| rule.capture(text))
        .map(|title| title_case(&title))
}
