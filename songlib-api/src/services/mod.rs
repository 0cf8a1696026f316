//! Song creation services
//!
//! - [`song_details`]: external song detail lookup (HTTP or fixed fallback)
//! - [`enrichment`]: two-phase song creation with best-effort enrichment

pub mod enrichment;
pub mod song_details;

pub use enrichment::{EnrichmentCoordinator, EnrichmentError};
pub use song_details::{
    fallback_details, provider_from_config, EnrichmentRequest, FallbackDetailProvider,
    HttpDetailProvider, ProviderError, SongDetailProvider, SongDetails,
};
