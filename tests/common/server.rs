//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database and its own
//! song detail service.

use super::constants::*;
use song_catalog_server::catalog::SongCatalog;
use song_catalog_server::server::{make_app, LimiterConfig, RequestsLoggingLevel, ServerConfig};
use song_catalog_server::song_details::{mock, SongDetailClient};
use song_catalog_server::song_store::{FilterRules, NewSong, SqliteSongStore, StoreOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Catalog behind the server, for seeding and direct checks in tests
    pub catalog: Arc<SongCatalog>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_txs: Vec<oneshot::Sender<()>>,
}

async fn bind_random_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let port = listener
        .local_addr()
        .expect("Failed to get local address")
        .port();
    (listener, port)
}

impl TestServer {
    /// Spawns a server backed by an in-process mock song detail service
    pub async fn spawn() -> Self {
        Self::spawn_inner(None).await
    }

    /// Spawns a server and inserts `SEEDED_SONGS` directly through the catalog
    pub async fn spawn_seeded() -> Self {
        let server = Self::spawn().await;
        for (group, title) in SEEDED_SONGS {
            server
                .catalog
                .add_song(NewSong {
                    group: group.to_string(),
                    title: title.to_string(),
                    release_date: SEEDED_RELEASE_DATE.to_string(),
                    text: SEEDED_TEXT.to_string(),
                    link: format!("https://example.org/{}", title.replace(' ', "-")),
                })
                .expect("Failed to seed song");
        }
        server
    }

    /// Spawns a server whose song detail lookups go to `details_url`
    pub async fn spawn_with_details_url(details_url: &str) -> Self {
        Self::spawn_inner(Some(details_url.to_string())).await
    }

    async fn spawn_inner(details_url: Option<String>) -> Self {
        let mut shutdown_txs = Vec::new();

        let details_url = match details_url {
            Some(url) => url,
            None => {
                let (listener, port) = bind_random_port().await;
                let (tx, rx) = oneshot::channel::<()>();
                shutdown_txs.push(tx);
                tokio::spawn(async move {
                    axum::serve(listener, mock::router())
                        .with_graceful_shutdown(async {
                            rx.await.ok();
                        })
                        .await
                        .expect("Mock song detail service failed");
                });
                format!("http://127.0.0.1:{}", port)
            }
        };

        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SqliteSongStore::new(
            temp_db_dir.path().join("songs.db"),
            StoreOptions::default(),
        )
        .expect("Failed to open song store");

        let details = SongDetailClient::new(&details_url, Duration::from_secs(2))
            .expect("Failed to build song detail client");

        let catalog = Arc::new(SongCatalog::new(
            Arc::new(store),
            Arc::new(details),
            FilterRules::default(),
        ));

        let (listener, port) = bind_random_port().await;
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            env: "development".to_string(),
            // Per-IP limiting would make tests depend on each other's timing
            limiter: LimiterConfig {
                enabled: false,
                ..Default::default()
            },
        };

        let app = make_app(config, catalog.clone()).expect("Failed to build app");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        shutdown_txs.push(shutdown_tx);

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            catalog,
            _temp_db_dir: temp_db_dir,
            _shutdown_txs: shutdown_txs,
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the healthcheck
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!("Server did not become ready within {}ms", SERVER_READY_TIMEOUT_MS);
            }

            match client
                .get(format!("{}/healthcheck", self.base_url))
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        for tx in self._shutdown_txs.drain(..) {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
