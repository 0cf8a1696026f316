//! songlib-api library - song catalog HTTP service
//!
//! Stores song metadata and serves create/read/update/delete over HTTP.
//! New songs are enriched from an external detail lookup on a best-effort
//! basis; lyric text can be read one verse at a time.

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::{routing::get, Router};
use songlib_common::db::SongStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::{EnrichmentCoordinator, SongDetailProvider};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Song storage
    pub store: Arc<dyn SongStore>,
    /// Song creation with enrichment
    pub coordinator: Arc<EnrichmentCoordinator>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn SongStore>, provider: Arc<dyn SongDetailProvider>) -> Self {
        let coordinator = Arc::new(EnrichmentCoordinator::new(store.clone(), provider));
        Self { store, coordinator }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::song_routes())
        .merge(api::health_routes())
        .route("/api/buildinfo", get(api::get_build_info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
