//! Song detail lookup client
//!
//! Looks up release date, lyric text and link for a (group, song) pair.
//! When no endpoint is configured the fixed [`fallback_details`] payload is
//! served instead, so the service runs offline.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use songlib_common::config::ServiceConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("songlib/", env!("CARGO_PKG_VERSION"));

pub const FALLBACK_RELEASE_DATE: &str = "2006-07-16";
pub const FALLBACK_TEXT: &str = "Ooh baby, don't you know I suffer?\n\
Ooh baby, can you hear me moan?\n\
You caught me under false pretenses\n\
How long before you let me go?\n\
\n\
Ooh\n\
You set my soul alight\n\
Ooh\n\
You set my soul alight";
pub const FALLBACK_LINK: &str = "https://www.youtube.com/watch?v=Xsp3_a-PMTw";

/// Detail lookup errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unexpected response status {0}")]
    StatusError(u16),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Lookup input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRequest {
    pub group_name: String,
    pub song_title: String,
}

/// Lookup result as sent on the wire
///
/// Missing fields decode as empty strings; completeness is judged by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct SongDetails {
    #[serde(rename = "releaseDate", default)]
    pub release_date: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: String,
}

impl SongDetails {
    /// Names of required fields that are empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("releaseDate", &self.release_date),
            ("text", &self.text),
            ("link", &self.link),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Source of song details
#[async_trait]
pub trait SongDetailProvider: Send + Sync {
    /// Provider identifier for logs
    fn source_id(&self) -> &'static str;

    /// Look up details for one song; a single attempt, never retried
    async fn fetch_details(&self, request: &EnrichmentRequest) -> Result<SongDetails, ProviderError>;
}

/// The fixed payload served when no endpoint is configured
pub fn fallback_details() -> SongDetails {
    SongDetails {
        release_date: FALLBACK_RELEASE_DATE.to_string(),
        text: FALLBACK_TEXT.to_string(),
        link: FALLBACK_LINK.to_string(),
    }
}

/// Provider returning [`fallback_details`] for every request
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackDetailProvider;

#[async_trait]
impl SongDetailProvider for FallbackDetailProvider {
    fn source_id(&self) -> &'static str {
        "fallback"
    }

    async fn fetch_details(&self, request: &EnrichmentRequest) -> Result<SongDetails, ProviderError> {
        tracing::info!(
            group = %request.group_name,
            song = %request.song_title,
            "External API not configured, serving fallback song details"
        );
        Ok(fallback_details())
    }
}

/// HTTP lookup: `GET <url>?group=<group>&song=<song>`
#[derive(Debug, Clone)]
pub struct HttpDetailProvider {
    http_client: reqwest::Client,
    url: String,
}

impl HttpDetailProvider {
    /// `timeout` of `None` leaves requests unbounded
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SongDetailProvider for HttpDetailProvider {
    fn source_id(&self) -> &'static str {
        "http"
    }

    async fn fetch_details(&self, request: &EnrichmentRequest) -> Result<SongDetails, ProviderError> {
        tracing::debug!(
            url = %self.url,
            group = %request.group_name,
            song = %request.song_title,
            "Querying song details API"
        );

        let response = self
            .http_client
            .get(&self.url)
            .query(&[
                ("group", request.group_name.as_str()),
                ("song", request.song_title.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ProviderError::StatusError(status.as_u16()));
        }

        response
            .json::<SongDetails>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

/// Select the provider for this configuration
pub fn provider_from_config(
    config: &ServiceConfig,
) -> Result<Arc<dyn SongDetailProvider>, ProviderError> {
    match &config.external_api_url {
        Some(url) => {
            tracing::info!(url = %url, timeout = ?config.external_api_timeout, "Using song details API");
            Ok(Arc::new(HttpDetailProvider::new(
                url.clone(),
                config.external_api_timeout,
            )?))
        }
        None => {
            tracing::info!("EXTERNAL_API_URL not set, song details come from the fallback payload");
            Ok(Arc::new(FallbackDetailProvider))
        }
    }
}
