//! Secret resolution for the OAuth client and the classifier API key.
//!
//! Secrets are resolved from, in priority order:
//!
//! 1. **Direct value** in the config file (local testing only)
//! 2. **File reference** (e.g. `clientSecretFile: /run/secrets/client_secret`)
//! 3. **Env var reference** (e.g. `clientSecretEnvVar: CLIENT_SECRET`)

use secrecy::SecretString;
use std::fs;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves a secret from the first non-empty source.
///
/// A named env var that is unset is an error, not a fall-through.
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    if let Some(value) = direct.filter(|v| !v.is_empty()) {
        return Ok(SecretString::from(value.to_string()));
    }

    if let Some(path) = file_path.filter(|p| !p.is_empty()) {
        let expanded = expand_home(path);
        return fs::read_to_string(&expanded)
            .map(|content| SecretString::from(content.trim().to_string()))
            .map_err(|source| SecretError::FileReadError {
                path: expanded,
                source,
            });
    }

    if let Some(name) = env_var.filter(|n| !n.is_empty()) {
        return match std::env::var(name) {
            Ok(value) => Ok(SecretString::from(value.trim())),
            Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                name: name.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                name: name.to_string(),
            }),
        };
    }

    Err(SecretError::NoSourceProvided)
}

/// Like [`resolve_secret`], but a missing source or unset variable is `None`.
pub fn resolve_secret_optional(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<Option<SecretString>> {
    match resolve_secret(direct, file_path, env_var) {
        Ok(secret) => Ok(Some(secret)),
        Err(SecretError::NoSourceProvided) | Err(SecretError::EnvVarNotSet { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Where one secret may come from, as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretSource {
    pub value: Option<String>,
    pub file: Option<String>,
    pub env_var: Option<String>,
}

impl SecretSource {
    pub fn env(name: impl Into<String>) -> Self {
        Self {
            env_var: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn resolve(&self) -> Result<SecretString> {
        resolve_secret(
            self.value.as_deref(),
            self.file.as_deref(),
            self.env_var.as_deref(),
        )
    }

    pub fn resolve_optional(&self) -> Result<Option<SecretString>> {
        resolve_secret_optional(
            self.value.as_deref(),
            self.file.as_deref(),
            self.env_var.as_deref(),
        )
    }
}

/// Expands a leading `~` to the home directory. `~user` is not supported.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let home = home.to_string_lossy();
            if path == "~" {
                return home.into_owned();
            }
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    #[serial]
    fn test_direct_value_takes_priority() {
        std::env::set_var("JOBTRACK_TEST_SECRET_1", "env_value");
        let result = resolve_secret(Some("direct_value"), None, Some("JOBTRACK_TEST_SECRET_1")).unwrap();
        assert_eq!(result.expose_secret(), "direct_value");
        std::env::remove_var("JOBTRACK_TEST_SECRET_1");
    }

    #[test]
    #[serial]
    fn test_file_takes_priority_over_env() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "file_value").unwrap();

        std::env::set_var("JOBTRACK_TEST_SECRET_2", "env_value");
        let source = SecretSource {
            value: None,
            file: Some(temp_file.path().to_str().unwrap().to_string()),
            env_var: Some("JOBTRACK_TEST_SECRET_2".to_string()),
        };
        assert_eq!(source.resolve().unwrap().expose_secret(), "file_value");
        std::env::remove_var("JOBTRACK_TEST_SECRET_2");
    }

    #[test]
    #[serial]
    fn test_env_var_is_trimmed() {
        std::env::set_var("JOBTRACK_TEST_SECRET_3", " sk-abc \n");
        let secret = SecretSource::env("JOBTRACK_TEST_SECRET_3").resolve().unwrap();
        assert_eq!(secret.expose_secret(), "sk-abc");
        std::env::remove_var("JOBTRACK_TEST_SECRET_3");
    }

    #[test]
    #[serial]
    fn test_optional_unset_env_is_none() {
        std::env::remove_var("JOBTRACK_TEST_SECRET_4");
        let source = SecretSource::env("JOBTRACK_TEST_SECRET_4");
        assert!(matches!(source.resolve(), Err(SecretError::EnvVarNotSet { .. })));
        assert!(source.resolve_optional().unwrap().is_none());
    }

    #[test]
    fn test_no_source_error() {
        assert!(matches!(
            resolve_secret(Some(""), None, None),
            Err(SecretError::NoSourceProvided)
        ));
    }

    #[test]
    fn test_file_not_found_error() {
        let result = resolve_secret(None, Some("/nonexistent/path/to/secret"), None);
        assert!(matches!(result, Err(SecretError::FileReadError { .. })));
    }
}
