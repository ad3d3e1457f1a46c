//! Company and job title extraction from message metadata.
//!
//! Extraction is a pure function of sender, subject and preview. The subject
//! and preview are searched together, joined by a newline so that a match
//! never spans the two.

pub mod company;
pub mod title;

pub use company::{extract_company, PLATFORM_DOMAINS};
pub use title::{builtin_title_rules, extract_job_title, TitleRule, DEFAULT_MAX_TOKENS};

/// Placeholder for a field that could not be derived.
pub const UNKNOWN: &str = "Unknown";

/// Fields derived from one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub company: String,
    pub job_title: String,
}

/// Applies the platform list and the ordered title rules to messages.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    platform_domains: Vec<String>,
    title_rules: Vec<TitleRule>,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor {
    /// Extractor with the built-in platform domains and title rules.
    pub fn new() -> Self {
        Self {
            platform_domains: PLATFORM_DOMAINS.iter().map(|d| d.to_string()).collect(),
            title_rules: builtin_title_rules(),
        }
    }

    /// Adds platform domains to the built-in list.
    pub fn with_platform_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platform_domains
            .extend(domains.into_iter().map(|d| d.into().trim().to_lowercase()));
        self
    }

    /// Appends title rules after the built-in ones.
    pub fn with_title_rules(mut self, rules: impl IntoIterator<Item = TitleRule>) -> Self {
        self.title_rules.extend(rules);
        self
    }

    pub fn title_rules(&self) -> &[TitleRule] {
        &self.title_rules
    }

    pub fn extract(&self, sender: &str, subject: &str, preview: &str) -> ExtractedFields {
        let text = format!("{}\n{}", subject, preview);

        let company = extract_company(
            sender,
            &text,
            self.platform_domains.iter().map(String::as_str),
        );
        let job_title =
            extract_job_title(&text, &self.title_rules).unwrap_or_else(|| UNKNOWN.to_string());

        ExtractedFields { company, job_title }
    }
}

/// Word-boundary title case: a letter following a non-letter is uppercased,
/// every other letter lowercased.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Trims surrounding whitespace, quotes, trailing punctuation and dashes.
pub(crate) fn clean_capture(s: &str) -> String {
    s.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '“' | '«'))
        .trim_end_matches(|c: char| {
            c.is_whitespace() || c.is_ascii_punctuation() || matches!(c, '–' | '—' | '”' | '»')
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("acme corp"), "Acme Corp");
        assert_eq!(title_case("SENIOR backend ENGINEER"), "Senior Backend Engineer");
        assert_eq!(title_case("o'neil-smith"), "O'Neil-Smith");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_clean_capture() {
        assert_eq!(clean_capture("  Acme Corp.  "), "Acme Corp");
        assert_eq!(clean_capture("\"Data Engineer\" -"), "Data Engineer");
        assert_eq!(clean_capture("C++"), "C");
    }

    #[test]
    fn test_extract_is_deterministic() {
        let extractor = FieldExtractor::new();
        let a = extractor.extract(
            "jobs@greenhouse.io",
            "Thank you for applying at Acme Corp",
            "",
        );
        let b = extractor.extract(
            "jobs@greenhouse.io",
            "Thank you for applying at Acme Corp",
            "",
        );
        assert_eq!(a, b);
        assert_eq!(a.company, "Acme Corp");
        assert_eq!(a.job_title, UNKNOWN);
    }

    #[test]
    fn test_extra_rules_run_after_builtins() {
        let extractor = FieldExtractor::new()
            .with_title_rules(vec![TitleRule::new(r"(?im)req\s+\d+\s+(.+)$", 4).unwrap()]);
        let fields = extractor.extract("hr@initech.com", "Req 42 platform engineer", "");
        assert_eq!(fields.job_title, "Platform Engineer");
        assert_eq!(fields.company, "Initech");
    }
}
