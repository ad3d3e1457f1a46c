//! Offline keyword classifier, used when no language model is configured.

use async_trait::async_trait;

use super::{Classifier, ResponseType};

/// Keywords indicating one response type.
struct ResponsePattern {
    response: ResponseType,
    keywords: &'static [&'static str],
}

/// Earlier entries win ties.
const PATTERNS: &[ResponsePattern] = &[
    ResponsePattern {
        response: ResponseType::Offer,
        keywords: &[
            "offer letter",
            "pleased to offer",
            "job offer",
            "extend an offer",
            "extend you an offer",
            "הצעת עבודה",
        ],
    },
    ResponsePattern {
        response: ResponseType::Rejected,
        keywords: &[
            "unfortunately",
            "regret to inform",
            "not moving forward",
            "not be moving forward",
            "move forward with other candidates",
            "decided to pursue other",
            "other candidates",
            "position has been filled",
            "no longer under consideration",
            "לצערנו",
        ],
    },
    ResponsePattern {
        response: ResponseType::Interview,
        keywords: &[
            "interview",
            "phone screen",
            "schedule a call",
            "schedule a time",
            "your availability",
            "next steps",
            "ראיון",
        ],
    },
    ResponsePattern {
        response: ResponseType::Applied,
        keywords: &[
            "thank you for applying",
            "thanks for applying",
            "application received",
            "received your application",
            "application has been submitted",
            "application was submitted",
            "thank you for your application",
            "thank you for your interest",
            "תודה על מועמדותך",
        ],
    },
];

/// Counts keyword hits per response type and picks the highest score.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify_text(&self, subject: &str, preview: &str) -> ResponseType {
        let combined = format!("{} {}", subject, preview).to_lowercase();

        let mut best: Option<(ResponseType, usize)> = None;
        for pattern in PATTERNS {
            let hits = pattern
                .keywords
                .iter()
                .filter(|k| combined.contains(*k))
                .count();
            if hits > 0 && best.as_ref().map_or(true, |(_, score)| hits > *score) {
                best = Some((pattern.response.clone(), hits));
            }
        }

        best.map(|(response, _)| response)
            .unwrap_or(ResponseType::Other)
    }
}

#[async_trait]
impl Classifier for KeywordClassifier {
    async fn classify(&self, subject: &str, preview: &str) -> ResponseType {
        self.classify_text(subject, preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_classification() {
        let classifier = KeywordClassifier::new();
        let cases = [
            ("Thank you for applying", "We received your application", ResponseType::Applied),
            ("Your application", "Unfortunately we will not be moving forward", ResponseType::Rejected),
            ("Interview invitation", "Please share your availability", ResponseType::Interview),
            ("Good news", "We are pleased to offer you the role", ResponseType::Offer),
            ("Newsletter", "Top stories this week", ResponseType::Other),
        ];

        for (subject, preview, expected) in cases {
            assert_eq!(
                classifier.classify_text(subject, preview),
                expected,
                "subject: {}",
                subject
            );
        }
    }

    #[test]
    fn test_rejection_beats_acknowledgement_on_tie() {
        let classifier = KeywordClassifier::new();
        assert_eq!(
            classifier.classify_text("Thank you for applying", "Unfortunately the role is closed"),
            ResponseType::Rejected
        );
    }

    #[tokio::test]
    async fn test_trait_delegates() {
        let classifier = KeywordClassifier::new();
        assert_eq!(
            classifier.classify("Phone screen", "").await,
            ResponseType::Interview
        );
    }
}
