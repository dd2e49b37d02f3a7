mod file_config;

pub use file_config::{FileConfig, LimiterFileConfig};

use crate::server::{LimiterConfig, RequestsLoggingLevel, ServerConfig};
use crate::song_store::StoreOptions;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const ENVIRONMENTS: &[&str] = &["development", "staging", "production"];

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub env: String,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub db_read_pool_size: usize,
    pub db_query_timeout_ms: u64,
    pub limiter_enabled: bool,
    pub limiter_rps: f64,
    pub limiter_burst: u32,
    pub song_details_url: String,
    pub song_details_timeout_sec: u64,
    pub mock_song_details_port: Option<u16>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            port: 8080,
            env: "development".to_string(),
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::Path,
            db_read_pool_size: 4,
            db_query_timeout_ms: 3000,
            limiter_enabled: true,
            limiter_rps: 2.0,
            limiter_burst: 4,
            song_details_url: "http://localhost:8081".to_string(),
            song_details_timeout_sec: 10,
            mock_song_details_port: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub env: String,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub db_read_pool_size: usize,
    pub db_query_timeout: Duration,
    pub limiter: LimiterConfig,
    pub song_details_url: String,
    pub song_details_timeout: Duration,
    pub mock_song_details_port: Option<u16>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "db_path must be specified via --db-path, MUSIC_DB_PATH or in config file"
                )
            })?;

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let env = file.env.unwrap_or_else(|| cli.env.clone());
        if !ENVIRONMENTS.contains(&env.as_str()) {
            bail!(
                "Unknown environment {:?}, expected one of {:?}",
                env,
                ENVIRONMENTS
            );
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or(cli.logging_level);

        let db_read_pool_size = file.db_read_pool_size.unwrap_or(cli.db_read_pool_size);
        if db_read_pool_size == 0 {
            bail!("db_read_pool_size must be greater than 0");
        }

        let db_query_timeout_ms = file.db_query_timeout_ms.unwrap_or(cli.db_query_timeout_ms);
        if db_query_timeout_ms == 0 {
            bail!("db_query_timeout_ms must be greater than 0");
        }

        let limiter_file = file.limiter.unwrap_or_default();
        let limiter = LimiterConfig {
            enabled: limiter_file.enabled.unwrap_or(cli.limiter_enabled),
            rps: limiter_file.rps.unwrap_or(cli.limiter_rps),
            burst: limiter_file.burst.unwrap_or(cli.limiter_burst),
        };
        if !(limiter.rps > 0.0 && limiter.rps.is_finite()) {
            bail!("limiter rps must be a positive number, got {}", limiter.rps);
        }
        if limiter.burst == 0 {
            bail!("limiter burst must be greater than 0");
        }

        let song_details_url = file
            .song_details_url
            .unwrap_or_else(|| cli.song_details_url.clone());
        let song_details_timeout_sec = file
            .song_details_timeout_sec
            .unwrap_or(cli.song_details_timeout_sec);
        if song_details_timeout_sec == 0 {
            bail!("song_details_timeout_sec must be greater than 0");
        }
        let mock_song_details_port = file.mock_song_details_port.or(cli.mock_song_details_port);

        Ok(Self {
            db_path,
            port,
            env,
            metrics_port,
            logging_level,
            db_read_pool_size,
            db_query_timeout: Duration::from_millis(db_query_timeout_ms),
            limiter,
            song_details_url,
            song_details_timeout: Duration::from_secs(song_details_timeout_sec),
            mock_song_details_port,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level,
            port: self.port,
            env: self.env.clone(),
            limiter: self.limiter.clone(),
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            read_pool_size: self.db_read_pool_size,
            query_timeout: self.db_query_timeout,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
