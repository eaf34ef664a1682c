//! Professional listing repository.
//!
//! The repository owns the visibility rules (approved, not suspended,
//! profile complete). Discovery only ever narrows its output further.

mod sqlite;
mod types;

pub use sqlite::SqliteListingRepository;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when reading listings.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid listing data: {0}")]
    InvalidData(String),
}

/// Trait for fetching searchable professional listings.
#[async_trait]
pub trait ProListingRepository: Send + Sync {
    /// Fetch visible listings, optionally restricted to a category.
    async fn search_pros(
        &self,
        query: &ListingQuery,
    ) -> Result<Vec<ProfessionalListing>, ListingError>;
}
