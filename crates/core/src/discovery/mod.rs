//! Professional discovery.
//!
//! [`SearchOrchestrator::search_pros`] is the single entry point. It chains
//! text resolution, the repository fetch, availability filtering and the
//! location filter. Each optional stage is a no-op when its input is absent.

mod orchestrator;
mod types;

pub use orchestrator::SearchOrchestrator;
pub use types::SearchFilters;

use thiserror::Error;

use crate::availability::AvailabilityError;
use crate::category::CategoryStoreError;
use crate::geocoding::GeocodingError;
use crate::listing::ListingError;

/// A collaborator failure surfaced by a search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error(transparent)]
    Category(#[from] CategoryStoreError),

    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error(transparent)]
    Geocoding(#[from] GeocodingError),
}
