//! In-process stand-in for the song-detail service.
//!
//! Answers every well-formed lookup with the same details, which is enough
//! to run the catalog locally and in tests without the real service.

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use super::models::SongDetail;

#[derive(Debug, Deserialize)]
struct InfoQuery {
    group: Option<String>,
    song: Option<String>,
}

pub fn canned_detail() -> SongDetail {
    SongDetail {
        release_date: "16.07.2006".to_string(),
        text: "Ooh baby, don't you know I suffer?\nOoh baby, can you hear me moan?\n\n\
               You caught me under false pretenses\nHow long before you let me go?\n\n\
               Ooh\nYou set my soul alight"
            .to_string(),
        link: "https://www.youtube.com/watch?v=Xsp3_a-PMTw".to_string(),
    }
}

async fn info(Query(query): Query<InfoQuery>) -> Response {
    match (query.group.as_deref(), query.song.as_deref()) {
        (Some(group), Some(song)) if !group.is_empty() && !song.is_empty() => {
            Json(canned_detail()).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "group and song are required").into_response(),
    }
}

pub fn router() -> Router {
    Router::new().route("/info", get(info))
}

/// Serve the mock on `port` of the loopback interface until the process
/// exits.
pub async fn run_mock_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Mock song detail service listening on {}", listener.local_addr()?);
    axum::serve(listener, router()).await
}
