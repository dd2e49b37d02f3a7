use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use song_catalog_server::catalog::SongCatalog;
use song_catalog_server::config::{AppConfig, CliConfig, FileConfig};
use song_catalog_server::server::metrics::{init_catalog_metrics, init_metrics};
use song_catalog_server::song_details::{mock::run_mock_server, SongDetailClient};
use song_catalog_server::song_store::{FilterRules, SongStore, SqliteSongStore};
use song_catalog_server::{run_server, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(disable_version_flag = true)]
struct CliArgs {
    /// Path to a TOML config file. Values found there override the CLI ones.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite songs database file.
    #[clap(long, env = "MUSIC_DB_PATH", value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Operating environment reported by the healthcheck.
    #[clap(long, default_value = "development")]
    pub env: String,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Number of read-only database connections.
    #[clap(long, default_value_t = 4)]
    pub db_read_pool_size: usize,

    /// Deadline for a single database operation, in milliseconds.
    #[clap(long, default_value_t = 3000)]
    pub db_query_timeout_ms: u64,

    /// Disable the per-IP request limiter.
    #[clap(long)]
    pub no_limiter: bool,

    /// Requests per second granted to each client.
    #[clap(long, default_value_t = 2.0)]
    pub limiter_rps: f64,

    /// Maximum burst of requests per client.
    #[clap(long, default_value_t = 4)]
    pub limiter_burst: u32,

    /// Base URL of the song detail service.
    #[clap(long, default_value = "http://localhost:8081")]
    pub song_details_url: String,

    /// Timeout in seconds for song detail requests.
    #[clap(long, default_value_t = 10)]
    pub song_details_timeout_sec: u64,

    /// Serve a canned song detail service on this loopback port.
    #[clap(long)]
    pub mock_song_details_port: Option<u16>,

    /// Print version and build information, then exit.
    #[clap(short = 'V', long)]
    pub version: bool,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            port: self.port,
            env: self.env.clone(),
            metrics_port: self.metrics_port,
            logging_level: self.logging_level,
            db_read_pool_size: self.db_read_pool_size,
            db_query_timeout_ms: self.db_query_timeout_ms,
            limiter_enabled: !self.no_limiter,
            limiter_rps: self.limiter_rps,
            limiter_burst: self.limiter_burst,
            song_details_url: self.song_details_url.clone(),
            song_details_timeout_sec: self.song_details_timeout_sec,
            mock_song_details_port: self.mock_song_details_port,
        }
    }
}

fn build_info() -> String {
    let build_time = env!("BUILD_TIMESTAMP")
        .parse::<i64>()
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "song-catalog-server {}\ngit hash:   {}\nbuild time: {}",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        build_time
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    if cli_args.version {
        println!("{}", build_info());
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    if let Some(mock_port) = config.mock_song_details_port {
        tokio::spawn(async move {
            if let Err(err) = run_mock_server(mock_port).await {
                error!("Mock song detail service on port {} failed: {}", mock_port, err);
            }
        });
    }

    info!("Opening songs database at {:?}", config.db_path);
    let store = Arc::new(SqliteSongStore::new(&config.db_path, config.store_options())?);

    init_metrics();
    let num_songs = store
        .count_songs()
        .context("Failed to count songs at startup")?;
    init_catalog_metrics(num_songs);

    info!("Song detail service configured at {}", config.song_details_url);
    let details = SongDetailClient::new(&config.song_details_url, config.song_details_timeout)
        .context("Failed to build song detail client")?;

    let catalog = SongCatalog::new(store, Arc::new(details), FilterRules::default());

    run_server(
        config.server_config(),
        Arc::new(catalog),
        config.metrics_port,
    )
    .await
}
