pub mod loader;
pub mod schema;

pub use loader::{
    build_extractor, compile_title_patterns, default_config_path, load_config,
    load_config_from_str, load_or_default,
};
pub use schema::{
    AuthConfig, AuthMode, ClassifierConfig, ClassifierKind, Config, ExtractionConfig, MailConfig,
    StorageConfig, TitlePattern, TrackingConfig,
};
