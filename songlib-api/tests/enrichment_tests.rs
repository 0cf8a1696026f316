//! End-to-end enrichment tests against a fake song details API
//!
//! The fake API is an axum server on an ephemeral local port; the service
//! under test reaches it through `HttpDetailProvider`.

use axum::{
    body::Body,
    extract::Query,
    http::{header, Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use songlib_api::services::{EnrichmentRequest, HttpDetailProvider, ProviderError, SongDetailProvider};
use songlib_api::{build_router, AppState};
use songlib_common::db::{init_memory_database, SongStore, SqliteSongStore};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

#[derive(Debug, Deserialize)]
struct InfoQuery {
    group: String,
    song: String,
}

/// Fake lookup: behavior is chosen by the requested song title
async fn fake_info(Query(query): Query<InfoQuery>) -> impl IntoResponse {
    match query.song.as_str() {
        "missing-link" => (
            StatusCode::OK,
            Json(json!({ "releaseDate": "16.07.2006", "text": "la la" })),
        )
            .into_response(),
        "server-error" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "not-json" => (StatusCode::OK, "<html>oops</html>").into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            StatusCode::OK.into_response()
        }
        _ => (
            StatusCode::OK,
            Json(json!({
                "releaseDate": "16.07.2006",
                "text": format!("{} by {}\n\nsecond verse", query.song, query.group),
                "link": "https://example.com/watch",
            })),
        )
            .into_response(),
    }
}

/// Start the fake API, returning its `/info` URL
async fn start_fake_api() -> String {
    let app = Router::new().route("/info", get(fake_info));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/info", addr)
}

async fn setup_app(url: &str) -> (Router, Arc<SqliteSongStore>) {
    let pool = init_memory_database().await.unwrap();
    let store = Arc::new(SqliteSongStore::new(pool));
    let provider = HttpDetailProvider::new(url, Some(Duration::from_secs(1))).unwrap();
    let state = AppState::new(store.clone(), Arc::new(provider));
    (build_router(state), store)
}

async fn create(app: &Router, group: &str, song: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/songs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "group": group, "song": song }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_lookup_passes_group_and_song() {
    let url = start_fake_api().await;
    let provider = HttpDetailProvider::new(url, None).unwrap();

    let details = provider
        .fetch_details(&EnrichmentRequest {
            group_name: "Muse & Friends".to_string(),
            song_title: "Hysteria?".to_string(),
        })
        .await
        .unwrap();

    // Query values arrive decoded, so reserved characters survive the trip
    assert_eq!(details.text, "Hysteria? by Muse & Friends\n\nsecond verse");
    assert_eq!(details.release_date, "16.07.2006");
}

#[tokio::test]
async fn test_lookup_status_and_parse_errors() {
    let url = start_fake_api().await;
    let provider = HttpDetailProvider::new(url, None).unwrap();
    let request = |song: &str| EnrichmentRequest {
        group_name: "Muse".to_string(),
        song_title: song.to_string(),
    };

    assert!(matches!(
        provider.fetch_details(&request("server-error")).await,
        Err(ProviderError::StatusError(500))
    ));
    assert!(matches!(
        provider.fetch_details(&request("not-json")).await,
        Err(ProviderError::ParseError(_))
    ));
}

#[tokio::test]
async fn test_create_enriches_from_api() {
    let url = start_fake_api().await;
    let (app, store) = setup_app(&url).await;

    let (status, body) = create(&app, "Muse", "Uprising").await;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["id"].as_i64().unwrap();
    let song = store.fetch(id).await.unwrap().unwrap();
    assert!(song.is_enriched());
    assert_eq!(song.release_date.unwrap().to_string(), "2006-07-16");
    assert_eq!(song.text.as_deref(), Some("Uprising by Muse\n\nsecond verse"));
    assert_eq!(song.link.as_deref(), Some("https://example.com/watch"));
}

#[tokio::test]
async fn test_create_succeeds_when_enrichment_fails() {
    let url = start_fake_api().await;
    let (app, store) = setup_app(&url).await;

    for song in ["missing-link", "server-error", "not-json", "slow"] {
        let (status, body) = create(&app, "Muse", song).await;
        assert_eq!(status, StatusCode::CREATED, "song={}", song);

        let id = body["id"].as_i64().unwrap();
        let stored = store.fetch(id).await.unwrap().unwrap();
        assert_eq!(stored.song_title, song);
        assert_eq!(stored.release_date, None, "song={}", song);
        assert_eq!(stored.text, None, "song={}", song);
        assert_eq!(stored.link, None, "song={}", song);
    }
}

#[tokio::test]
async fn test_create_succeeds_when_api_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/info", listener.local_addr().unwrap());
    drop(listener);

    let (app, store) = setup_app(&url).await;
    let (status, body) = create(&app, "Muse", "Starlight").await;
    assert_eq!(status, StatusCode::CREATED);

    let song = store.fetch(body["id"].as_i64().unwrap()).await.unwrap().unwrap();
    assert!(!song.is_enriched());
    assert_eq!(song.group_name, "Muse");
}
