//! Song creation with best-effort enrichment
//!
//! Creation is two-phase:
//! 1. Insert a base record (group and title). Failure here fails the creation.
//! 2. Look up song details and write them onto the record. Any failure in this
//!    phase is logged and absorbed; the base record stays and the caller still
//!    gets its id.
//!
//! There is no rollback and no retry. A lookup is accepted only when release
//! date, text and link are all present, so a record is never partially
//! enriched by this path.

use songlib_common::db::{parse_release_date, SongEnrichment, SongStore};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::song_details::{EnrichmentRequest, ProviderError, SongDetailProvider, SongDetails};

/// Reasons enrichment was abandoned
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Song details lookup failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Incomplete song details, missing: {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),

    #[error("Unusable release date: {0}")]
    ReleaseDate(String),
}

/// Coordinates base insert, detail lookup and enrichment update
#[derive(Clone)]
pub struct EnrichmentCoordinator {
    store: Arc<dyn SongStore>,
    provider: Arc<dyn SongDetailProvider>,
}

impl EnrichmentCoordinator {
    pub fn new(store: Arc<dyn SongStore>, provider: Arc<dyn SongDetailProvider>) -> Self {
        Self { store, provider }
    }

    /// Create a song and try to enrich it
    ///
    /// Only the base insert can fail. Once it succeeds the new id is returned
    /// whatever happens to enrichment.
    ///
    /// The lookup and enrichment update run on their own task, so dropping
    /// this future (client disconnect) does not interrupt them.
    pub async fn create(&self, group_name: &str, song_title: &str) -> songlib_common::Result<i64> {
        let id = self.store.insert_base(group_name, song_title).await?;
        info!(song_id = id, group = %group_name, song = %song_title, "Song created");

        let request = EnrichmentRequest {
            group_name: group_name.to_string(),
            song_title: song_title.to_string(),
        };

        let store = Arc::clone(&self.store);
        let provider = Arc::clone(&self.provider);
        let task = tokio::spawn(enrich(store, provider, id, request));

        if let Err(e) = task.await {
            error!(song_id = id, error = %e, "Enrichment task failed");
        }

        Ok(id)
    }
}

/// Single lookup plus enrichment update for a freshly created song
///
/// Failures are logged here and go no further.
async fn enrich(
    store: Arc<dyn SongStore>,
    provider: Arc<dyn SongDetailProvider>,
    id: i64,
    request: EnrichmentRequest,
) {
    let enrichment = match lookup(provider.as_ref(), &request).await {
        Ok(enrichment) => enrichment,
        Err(e) => {
            warn!(
                song_id = id,
                source = provider.source_id(),
                error = %e,
                "Song details not enriched, keeping base record"
            );
            return;
        }
    };

    match store.apply_enrichment(id, &enrichment).await {
        Ok(true) => info!(song_id = id, source = provider.source_id(), "Song enriched"),
        Ok(false) => warn!(song_id = id, "Song removed before enrichment was stored"),
        Err(e) => error!(song_id = id, error = %e, "Failed to store song details"),
    }
}

/// One lookup attempt, validated and converted for storage
async fn lookup(
    provider: &dyn SongDetailProvider,
    request: &EnrichmentRequest,
) -> Result<SongEnrichment, EnrichmentError> {
    let details = provider.fetch_details(request).await?;
    to_enrichment(details)
}

fn to_enrichment(details: SongDetails) -> Result<SongEnrichment, EnrichmentError> {
    let missing = details.missing_fields();
    if !missing.is_empty() {
        return Err(EnrichmentError::Incomplete(missing));
    }

    let release_date = parse_release_date(&details.release_date)
        .map_err(|_| EnrichmentError::ReleaseDate(details.release_date.clone()))?;

    Ok(SongEnrichment {
        release_date,
        text: details.text,
        link: details.link,
    })
}
