use std::path::{Path, PathBuf};

use log::info;

use crate::config::schema::{Config, TitlePattern};
use crate::error::ConfigError;
use crate::extractor::{FieldExtractor, TitleRule};

pub const CONFIG_FILE_NAME: &str = "config.json";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// `$XDG_CONFIG_HOME/jobtrack/config.json` or the platform equivalent.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("jobtrack").join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDirectory)
}

/// Loads `explicit` if given, else the default config file if it exists,
/// else built-in defaults.
pub fn load_or_default(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    match default_config_path() {
        Ok(path) if path.exists() => {
            info!("Loading config from {}", path.display());
            load_config(path)
        }
        _ => {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let positive = [
        ("tracking.lookback_days", config.tracking.lookback_days),
        ("tracking.stale_after_days", config.tracking.stale_after_days),
        ("mail.page_size", config.mail.page_size),
        ("mail.max_pages", config.mail.max_pages),
    ];
    for (name, value) in positive {
        if value == 0 {
            return Err(ConfigError::Validation {
                message: format!("{} must be greater than zero", name),
            });
        }
    }

    if config.auth.scopes.iter().all(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation {
            message: "auth.scopes must contain at least one scope".to_string(),
        });
    }

    compile_title_patterns(&config.extraction.title_patterns)?;

    Ok(())
}

/// Compiles configured title patterns, each of which needs a capture group.
pub fn compile_title_patterns(patterns: &[TitlePattern]) -> Result<Vec<TitleRule>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            if p.max_tokens == 0 {
                return Err(ConfigError::InvalidPattern {
                    pattern: p.pattern.clone(),
                    reason: "max_tokens must be at least 1".to_string(),
                });
            }

            let rule = TitleRule::new(&p.pattern, p.max_tokens).map_err(|e| {
                ConfigError::InvalidPattern {
                    pattern: p.pattern.clone(),
                    reason: e.to_string(),
                }
            })?;

            if rule.capture_groups() == 0 {
                return Err(ConfigError::InvalidPattern {
                    pattern: p.pattern.clone(),
                    reason: "Pattern must contain a capture group for the title".to_string(),
                });
            }

            Ok(rule)
        })
        .collect()
}

/// Field extractor with the configured platform domains and title patterns.
pub fn build_extractor(config: &Config) -> Result<FieldExtractor, ConfigError> {
    let rules = compile_title_patterns(&config.extraction.title_patterns)?;
    Ok(FieldExtractor::new()
        .with_platform_domains(config.extraction.platform_domains.iter().cloned())
        .with_title_rules(rules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{AuthMode, ClassifierKind};

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.tracking.lookback_days, 200);
        assert_eq!(config.tracking.stale_after_days, 10);
        assert_eq!(config.storage.active_path, "job_applications.csv");
        assert_eq!(config.mail.page_size, 50);
        assert_eq!(config.auth.mode, AuthMode::DeviceCode);
        assert_eq!(config.auth.client_id_env_var.as_deref(), Some("CLIENT_ID"));
        assert_eq!(config.classifier.kind, ClassifierKind::OpenAi);
        assert_eq!(config.classifier.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_load_full_config() {
        let config_json = r#"
        {
            "version": "1.0",
            "storage": { "active_path": "data/active.csv", "report_directory": "out" },
            "tracking": { "lookback_days": 30 },
            "mail": { "folder": "archive", "mailbox": "me@example.com" },
            "auth": {
                "mode": "clientCredentials",
                "tenant": "contoso.onmicrosoft.com",
                "clientIdEnvVar": "MY_CLIENT",
                "token_cache_path": "state/tokens.json"
            },
            "classifier": { "kind": "keywords" },
            "extraction": {
                "platform_domains": ["hirehive.com"],
                "title_patterns": [{ "pattern": "(?i)opening:\\s*(.+)$", "max_tokens": 4 }]
            }
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.storage.active_path, "data/active.csv");
        assert_eq!(config.storage.archive_path, "job_applications_archived.csv");
        assert_eq!(config.tracking.lookback_days, 30);
        assert_eq!(config.mail.mailbox.as_deref(), Some("me@example.com"));
        assert_eq!(config.auth.mode, AuthMode::ClientCredentials);
        assert_eq!(config.auth.client_id_source().env_var.as_deref(), Some("MY_CLIENT"));
        assert_eq!(config.auth.token_cache_path, "state/tokens.json");
        assert_eq!(config.classifier.kind, ClassifierKind::Keywords);
        assert_eq!(config.extraction.title_patterns[0].max_tokens, 4);

        let extractor = build_extractor(&config).unwrap();
        let fields = extractor.extract("a@hirehive.com", "Opening: QA Lead at Umbrella", "");
        assert_eq!(fields.company, "Umbrella");
    }

    #[test]
    fn test_invalid_version() {
        let result = load_config_from_str(r#"{ "version": "2.0" }"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_zero_values_rejected() {
        for json in [
            r#"{ "tracking": { "lookback_days": 0 } }"#,
            r#"{ "tracking": { "stale_after_days": 0 } }"#,
            r#"{ "mail": { "page_size": 0 } }"#,
            r#"{ "mail": { "max_pages": 0 } }"#,
            r#"{ "auth": { "scopes": [] } }"#,
        ] {
            assert!(
                matches!(load_config_from_str(json), Err(ConfigError::Validation { .. })),
                "{}",
                json
            );
        }
    }

    #[test]
    fn test_invalid_title_patterns() {
        for json in [
            r#"{ "extraction": { "title_patterns": [{ "pattern": "([unclosed" }] } }"#,
            r#"{ "extraction": { "title_patterns": [{ "pattern": "no group" }] } }"#,
            r#"{ "extraction": { "title_patterns": [{ "pattern": "(x)", "max_tokens": 0 }] } }"#,
        ] {
            assert!(
                matches!(load_config_from_str(json), Err(ConfigError::InvalidPattern { .. })),
                "{}",
                json
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            load_config_from_str("{ not json"),
            Err(ConfigError::ParseJson(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/jobtrack/config.json");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
