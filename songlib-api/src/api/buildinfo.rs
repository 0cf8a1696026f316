//! Build information API endpoint

use axum::response::Json;
use serde::Serialize;

/// Values stamped in by build.rs
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
}

static BUILD_INFO: BuildInfo = BuildInfo {
    version: env!("CARGO_PKG_VERSION"),
    git_hash: env!("GIT_HASH"),
    build_timestamp: env!("BUILD_TIMESTAMP"),
    build_profile: env!("BUILD_PROFILE"),
};

/// GET /api/buildinfo
pub async fn get_build_info() -> Json<&'static BuildInfo> {
    Json(&BUILD_INFO)
}
