//! Company name derivation from the sender domain and message text.

use std::sync::LazyLock;

use regex::Regex;

use super::{clean_capture, title_case, UNKNOWN};

/// ATS and job-board domains whose sender address does not name the employer.
pub const PLATFORM_DOMAINS: &[&str] = &[
    "greenhouse.io",
    "greenhouse-mail.io",
    "lever.co",
    "hire.lever.co",
    "comeet.co",
    "comeet.com",
    "myworkdayjobs.com",
    "myworkday.com",
    "workday.com",
    "linkedin.com",
    "indeed.com",
    "indeedemail.com",
    "smartrecruiters.com",
    "ashbyhq.com",
    "workable.com",
    "workablemail.com",
    "icims.com",
    "jobvite.com",
    "bamboohr.com",
    "breezy.hr",
    "recruitee.com",
    "teamtailor.com",
    "successfactors.com",
    "taleo.net",
    "glassdoor.com",
    "ziprecruiter.com",
    "wellfound.com",
    "hibob.com",
];

/// Subdomain labels that name a mail system rather than a company.
const GENERIC_LABELS: &[&str] = &[
    "mail",
    "email",
    "e-mail",
    "mailer",
    "jobs",
    "job",
    "careers",
    "career",
    "hire",
    "hiring",
    "recruiting",
    "talent",
    "notifications",
    "notification",
    "notify",
    "no-reply",
    "noreply",
    "donotreply",
    "do-not-reply",
    "app",
    "apps",
    "www",
    "us",
    "eu",
    "uk",
    "em",
];

static RE_COMPANY_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    // A dot may sit inside a name token or end the name (`Inc.`), never
    // before a following word.
    Regex::new(
        r"(?i:\b(?:on behalf of|at|from))[ \t]+(\p{Lu}[\w&'\-]*(?:\.[\w&'\-]+)*(?:[ \t]+\p{Lu}[\w&'\-]*(?:\.[\w&'\-]+)*)*\.?)",
    )
        .unwrap()
});

/// Returns the platform domain `domain` belongs to, if any.
fn matching_platform<'a, I>(domain: &str, platforms: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    platforms
        .into_iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .find(|p| domain == p.as_str() || domain.ends_with(&format!(".{}", p)))
}

/// Label directly left of the platform domain, e.g. `acme` in `acme.greenhouse.io`.
fn platform_subdomain(domain: &str, platform: &str) -> Option<String> {
    let prefix = domain.strip_suffix(platform)?.strip_suffix('.')?;
    let label = prefix.rsplit('.').next()?.trim();
    if label.is_empty() || GENERIC_LABELS.contains(&label) {
        return None;
    }
    Some(label.to_string())
}

/// First label of a domain, e.g. `mail` in `mail.acme.com`.
fn first_label(domain: &str) -> Option<&str> {
    domain.split('.').map(str::trim).find(|l| !l.is_empty())
}

/// Finds an `at|from|on behalf of <Capitalized Name>` mention in `text`.
pub fn company_mention(text: &str) -> Option<String> {
    RE_COMPANY_MENTION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| clean_capture(m.as_str()))
        .find(|name| !name.is_empty())
        .map(|name| title_case(&name))
}

/// Derives the company for a message.
///
/// `text` is the subject and preview, separated by a newline.
pub fn extract_company<'a, I>(sender: &str, text: &str, platforms: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let Some((_, domain)) = sender.trim().rsplit_once('@') else {
        return UNKNOWN.to_string();
    };
    let domain = domain.trim().trim_end_matches('>').to_lowercase();

    if let Some(platform) = matching_platform(&domain, platforms) {
        if let Some(name) = company_mention(text) {
            return name;
        }
        return platform_subdomain(&domain, &platform)
            .map(|label| title_case(&label))
            .unwrap_or_else(|| UNKNOWN.to_string());
    }

    first_label(&domain)
        .map(title_case)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(sender: &str, text: &str) -> String {
        extract_company(sender, text, PLATFORM_DOMAINS.iter().copied())
    }

    #[test]
    fn test_platform_sender_uses_mention() {
        assert_eq!(
            company("jobs@greenhouse.io", "Thank you for applying at Acme Corp\n"),
            "Acme Corp"
        );
        assert_eq!(
            company("no-reply@comeet.co", "Update on behalf of Globex Industries."),
            "Globex Industries"
        );
    }

    #[test]
    fn test_mention_stops_at_sentence_break() {
        assert_eq!(
            company("jobs@greenhouse.io", "Invitation from Acme Inc. Please Confirm"),
            "Acme Inc"
        );
        assert_eq!(
            company("no-reply@comeet.co", "Update on behalf of Initech Ltd. We Will Follow Up"),
            "Initech Ltd"
        );
    }

    #[test]
    fn test_mention_does_not_cross_into_preview() {
        assert_eq!(
            company(
                "jobs@greenhouse.io",
                "Thank you for applying at Acme Corp\nWe received your application"
            ),
            "Acme Corp"
        );
    }

    #[test]
    fn test_mention_keyword_requires_capitalized_name() {
        // "at the" is lowercase, so the subdomain fallback applies
        assert_eq!(
            company("acme@hire.lever.co", "Looking at the role"),
            "Unknown"
        );
        assert_eq!(company("x@initech.greenhouse.io", "Looking at the role"), "Initech");
    }

    #[test]
    fn test_platform_without_mention_or_subdomain() {
        assert_eq!(company("jobs@greenhouse.io", "Your application\n"), "Unknown");
        assert_eq!(
            company("notify@notifications.linkedin.com", "New jobs for you\n"),
            "Unknown"
        );
    }

    #[test]
    fn test_non_platform_domain() {
        assert_eq!(company("careers@acme.com", "Thanks"), "Acme");
        assert_eq!(company("hr@wayne-enterprises.com", ""), "Wayne-Enterprises");
        assert_eq!(company("jobs@monday.co.il", ""), "Monday");
        assert_eq!(company("Talent@Initech.CO.UK", ""), "Initech");
    }

    #[test]
    fn test_non_platform_subdomain_uses_first_label() {
        assert_eq!(company("hr@mail.acme.com", "Hello there"), "Mail");
        assert_eq!(company("jobs@eu.globex.co.uk", ""), "Eu");
        assert_eq!(company("x@.acme.com", ""), "Acme");
    }

    #[test]
    fn test_sender_without_at() {
        assert_eq!(company("not-an-address", "at Acme"), "Unknown");
        assert_eq!(company("someone@", ""), "Unknown");
    }

    #[test]
    fn test_extra_platform_domain() {
        let platforms = ["hirehive.com"];
        assert_eq!(
            extract_company("a@hirehive.com", "Applied at Umbrella Labs", platforms),
            "Umbrella Labs"
        );
    }
}
