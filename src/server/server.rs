use anyhow::{Context, Result};
use std::any::Any;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::State,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{error, info};

use super::errors::ApiError;
use super::metrics::run_metrics_server;
use super::songs::{
    create_song, delete_song, get_lyrics, get_song, list_songs, method_not_allowed, not_found,
    update_song,
};
use super::{apply_rate_limit, log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct SystemInfo {
    environment: String,
    version: &'static str,
    hash: String,
    uptime: String,
}

#[derive(Serialize)]
struct HealthcheckResponse {
    status: &'static str,
    system_info: SystemInfo,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn healthcheck(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthcheckResponse {
        status: "available",
        system_info: SystemInfo {
            environment: state.config.env.clone(),
            version: env!("CARGO_PKG_VERSION"),
            hash: state.hash.clone(),
            uptime: format_uptime(state.start_time.elapsed()),
        },
    })
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Request handler panicked: {}", details);
    ApiError::Internal.into_response()
}

pub fn make_app(config: ServerConfig, catalog: GuardedSongCatalog) -> Result<Router> {
    let state = ServerState::new(config.clone(), catalog);

    let song_routes: Router = Router::new()
        .route(
            "/songs",
            get(list_songs)
                .post(create_song)
                .fallback(method_not_allowed),
        )
        .route(
            "/songs/{id}",
            get(get_song)
                .put(update_song)
                .delete(delete_song)
                .fallback(method_not_allowed),
        )
        .route(
            "/songs/{id}/lyrics",
            get(get_lyrics).fallback(method_not_allowed),
        )
        .with_state(state.clone());

    let mut app: Router = Router::new()
        .route(
            "/healthcheck",
            get(healthcheck).fallback(method_not_allowed),
        )
        .with_state(state.clone())
        .merge(song_routes)
        .fallback(not_found);

    if config.limiter.enabled {
        app = apply_rate_limit(app, &config.limiter)?;
    }
    app = app.layer(middleware::from_fn_with_state(config.requests_logging_level, log_requests));
    app = app.layer(CatchPanicLayer::custom(handle_panic));

    Ok(app)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, finishing in-flight requests");
}

pub async fn run_server(
    config: ServerConfig,
    catalog: GuardedSongCatalog,
    metrics_port: u16,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, catalog)?;

    tokio::spawn(async move {
        if let Err(err) = run_metrics_server(metrics_port).await {
            error!("Metrics server on port {} failed: {}", metrics_port, err);
        }
    });

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port)))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SongCatalog;
    use crate::server::config::LimiterConfig;
    use crate::server::RequestsLoggingLevel;
    use crate::song_details::{SongDetail, SongDetailError, SongDetailProvider};
    use crate::song_store::{FilterRules, SqliteSongStore, StoreOptions};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct FixedDetails;

    #[async_trait]
    impl SongDetailProvider for FixedDetails {
        async fn fetch_details(&self, _: &str, _: &str) -> Result<SongDetail, SongDetailError> {
            Ok(SongDetail {
                release_date: "01.02.2003".to_string(),
                text: "a\n\nb\n\nc".to_string(),
                link: "https://example.org".to_string(),
            })
        }
    }

    fn test_config() -> ServerConfig {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            limiter: LimiterConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn make_test_app() -> (Router, TempDir) {
        let dir = TempDir::new().unwrap();
        let store =
            SqliteSongStore::new(dir.path().join("songs.db"), StoreOptions::default()).unwrap();
        let catalog = SongCatalog::new(
            Arc::new(store),
            Arc::new(FixedDetails),
            FilterRules::default(),
        );
        (make_app(test_config(), Arc::new(catalog)).unwrap(), dir)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 01:01:01");
    }

    #[tokio::test]
    async fn test_healthcheck() {
        let (app, _dir) = make_test_app();
        let response = send(&app, "GET", "/healthcheck", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "available");
        assert_eq!(body["system_info"]["environment"], "development");
        assert_eq!(body["system_info"]["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_unknown_route_and_wrong_method() {
        let (app, _dir) = make_test_app();

        let response = send(&app, "GET", "/albums", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(json_body(response).await["error"].is_string());

        let response = send(&app, "PATCH", "/songs/1", None).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            json_body(response).await["error"],
            "the PATCH method is not supported for this resource"
        );

        let response = send(&app, "POST", "/songs/1/lyrics", None).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_invalid_ids_are_not_found() {
        let (app, _dir) = make_test_app();
        for uri in ["/songs/abc", "/songs/0", "/songs/-1", "/songs/x/lyrics"] {
            let response = send(&app, "GET", uri, None).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri={uri}");
        }
        let response = send(&app, "DELETE", "/songs/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (app, _dir) = make_test_app();
        let response = send(&app, "POST", "/songs", Some("{\"group\": ")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let (app, _dir) = make_test_app();

        let response = send(
            &app,
            "POST",
            "/songs",
            Some(r#"{"group": "Muse", "song": "Uprising"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["location"], "/songs/1");
        let body = json_body(response).await;
        assert_eq!(body["song"]["name"], "Uprising");
        assert_eq!(body["song"]["releaseDate"], "01.02.2003");
        assert_eq!(body["song"]["version"], 1);

        let response = send(&app, "GET", "/songs/1/lyrics?page=3", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["lyrics"], serde_json::json!(["c"]));
    }

    #[tokio::test]
    async fn test_invalid_listing_parameters() {
        let (app, _dir) = make_test_app();
        let response = send(&app, "GET", "/songs?page=0&sort=title", None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert!(body["error"]["page"].is_string());
        assert_eq!(body["error"]["sort"], "invalid sort value");
    }

    #[tokio::test]
    async fn test_panic_is_rendered_as_internal_error() {
        async fn boom() -> &'static str {
            panic!("boom")
        }
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic));

        let response = send(&app, "GET", "/boom", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json_body(response).await["error"].is_string());
    }

    #[test]
    fn test_app_builds_with_rate_limiting() {
        let dir = TempDir::new().unwrap();
        let store =
            SqliteSongStore::new(dir.path().join("songs.db"), StoreOptions::default()).unwrap();
        let catalog = SongCatalog::new(
            Arc::new(store),
            Arc::new(FixedDetails),
            FilterRules::default(),
        );
        assert!(make_app(ServerConfig::default(), Arc::new(catalog)).is_ok());
    }
}
