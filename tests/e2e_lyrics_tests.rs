//! End-to-end tests for lyrics pagination

mod common;

use common::{TestClient, TestServer, GROUP_MUSE};
use reqwest::StatusCode;
use serde_json::{json, Value};

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_lyrics_default_page_is_first_verse() {
    let server = TestServer::spawn_seeded().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_lyrics(1, &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["lyrics"], json!(["verse one\nline two"]));
}

#[tokio::test]
async fn test_lyrics_pages_walk_through_verses() {
    let server = TestServer::spawn_seeded().await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client
        .get_lyrics(1, &[("page", "2"), ("size", "1")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["lyrics"], json!(["verse two"]));

    // The last page holds whatever is left
    let body: Value = client
        .get_lyrics(1, &[("page", "2"), ("size", "3")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["lyrics"], json!(["verse four"]));

    // Past the end is empty, not an error
    let response = client.get_lyrics(1, &[("page", "9"), ("size", "2")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["lyrics"], json!([]));
}

#[tokio::test]
async fn test_lyrics_of_created_song() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .create_song(GROUP_MUSE, "Supermassive Black Hole")
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = client
        .get_lyrics(1, &[("page", "3")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["lyrics"], json!(["Ooh\nYou set my soul alight"]));
}

#[tokio::test]
async fn test_lyrics_follow_text_updates() {
    let server = TestServer::spawn_seeded().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .update_song(2, json!({ "text": "a\n\nb", "version": 1 }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = client
        .get_lyrics(2, &[("size", "5")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["lyrics"], json!(["a", "b"]));
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_lyrics_with_invalid_parameters_is_unprocessable() {
    let server = TestServer::spawn_seeded().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .get_lyrics(1, &[("page", "zero"), ("size", "500")])
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["page"], "must be a positive integer");
    assert_eq!(body["error"]["size"], "must be between 1 and 100");
}

#[tokio::test]
async fn test_lyrics_of_missing_song_returns_404() {
    let server = TestServer::spawn_seeded().await;
    let client = TestClient::new(server.base_url.clone());

    assert_eq!(client.get_lyrics(77, &[]).await.status(), StatusCode::NOT_FOUND);

    assert_eq!(client.delete_song(1).await.status(), StatusCode::OK);
    assert_eq!(client.get_lyrics(1, &[]).await.status(), StatusCode::NOT_FOUND);
}
