use std::path::PathBuf;

use crate::config::Config;

pub struct PipelineConfig {
    pub watermark_path: PathBuf,
    pub lookback_days: u32,
    pub stale_after_days: u32,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            watermark_path: PathBuf::from(&config.storage.watermark_path),
            lookback_days: config.tracking.lookback_days,
            stale_after_days: config.tracking.stale_after_days,
        }
    }
}
