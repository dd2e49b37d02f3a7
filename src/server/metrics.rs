use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::net::SocketAddr;
use std::time::Duration;

/// Metric name prefix for all song catalog metrics
const PREFIX: &str = "song_catalog";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Database Metrics
    pub static ref DB_QUERY_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_db_query_duration_seconds"),
            "Database query duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 3.0]),
        &["operation"]
    ).expect("Failed to create db_query_duration_seconds metric");

    pub static ref DB_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_db_errors_total"), "Failed database operations"),
        &["operation", "kind"]
    ).expect("Failed to create db_errors_total metric");

    // Catalog Metrics
    pub static ref SONGS_TOTAL: Gauge = Gauge::new(
        format!("{PREFIX}_songs_total"),
        "Number of songs in the catalog"
    ).expect("Failed to create songs_total metric");

    pub static ref EDIT_CONFLICTS_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_edit_conflicts_total"),
        "Updates rejected because the song version changed"
    ).expect("Failed to create edit_conflicts_total metric");

    pub static ref LOOKUP_FAILURES_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_song_detail_lookup_failures_total"),
        "Failed song detail lookups"
    ).expect("Failed to create song_detail_lookup_failures_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(DB_QUERY_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(DB_ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(SONGS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(EDIT_CONFLICTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(LOOKUP_FAILURES_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn init_catalog_metrics(num_songs: usize) {
    SONGS_TOTAL.set(num_songs as f64);
    tracing::info!("Catalog metrics initialized: {} songs", num_songs);
}

/// Collapses concrete ids so that every song maps to the same label.
pub fn metric_path(path: &str) -> &'static str {
    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    match segments.as_slice() {
        ["", "healthcheck"] => "/healthcheck",
        ["", "songs"] => "/songs",
        ["", "songs", _] => "/songs/{id}",
        ["", "songs", _, "lyrics"] => "/songs/{id}/lyrics",
        _ => "other",
    }
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let path = metric_path(path);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Record a database query
pub fn record_db_query(operation: &str, duration: Duration) {
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

pub fn record_store_error(operation: &str, kind: &str) {
    DB_ERRORS_TOTAL.with_label_values(&[operation, kind]).inc();
}

pub fn record_edit_conflict() {
    EDIT_CONFLICTS_TOTAL.inc();
}

pub fn record_lookup_failure() {
    LOOKUP_FAILURES_TOTAL.inc();
}

pub fn record_song_created() {
    SONGS_TOTAL.inc();
}

pub fn record_song_deleted() {
    SONGS_TOTAL.dec();
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_else(|_| String::from(""));
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

/// Serve `/metrics` on its own port, apart from the public API.
pub async fn run_metrics_server(port: u16) -> std::io::Result<()> {
    let app = Router::new().route("/metrics", get(metrics_handler));
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
    axum::serve(listener, app).await
}
