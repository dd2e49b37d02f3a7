use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_path: Option<String>,
    pub port: Option<u16>,
    pub env: Option<String>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,

    // Store settings
    pub db_read_pool_size: Option<usize>,
    pub db_query_timeout_ms: Option<u64>,

    // Song detail lookup
    pub song_details_url: Option<String>,
    pub song_details_timeout_sec: Option<u64>,
    pub mock_song_details_port: Option<u16>,

    pub limiter: Option<LimiterFileConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LimiterFileConfig {
    pub enabled: Option<bool>,
    pub rps: Option<f64>,
    pub burst: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
