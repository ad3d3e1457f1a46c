//! Helpers for keeping personal data out of log fields and span attributes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Masks the local part of an address, keeping its first character and the domain.
///
/// - `jane.doe@acme.com` → `j***@acme.com`
/// - `not-an-address` → `***`
pub fn redact_email(address: &str) -> String {
    let address = address.trim();
    match address.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain.to_lowercase())
        }
        _ => "***".to_string(),
    }
}

/// Short deterministic hash of an address, for correlating log lines.
pub fn hash_email(address: &str) -> String {
    let mut hasher = DefaultHasher::new();
    address.trim().to_lowercase().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Returns only the filename component of a path.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_email() {
        assert_eq!(redact_email("jane.doe@Acme.com"), "j***@acme.com");
        assert_eq!(redact_email(" a@x.io "), "a***@x.io");
        assert_eq!(redact_email("@x.io"), "***");
        assert_eq!(redact_email("nobody"), "***");
    }

    #[test]
    fn test_hash_email_is_case_insensitive() {
        assert_eq!(hash_email("Jobs@Acme.com"), hash_email("jobs@acme.com"));
        assert_ne!(hash_email("a@acme.com"), hash_email("b@acme.com"));
        assert_eq!(hash_email("a@acme.com").len(), 16);
    }

    #[test]
    fn test_redact_path_returns_filename() {
        assert_eq!(
            redact_path(Path::new("/home/user/jobs/job_applications.csv")),
            "job_applications.csv"
        );
        assert_eq!(redact_path(Path::new("/")), "<unknown>");
    }
}
