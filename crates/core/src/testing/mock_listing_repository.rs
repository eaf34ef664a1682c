//! Mock listing repository for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::listing::{ListingError, ListingQuery, ProListingRepository, ProfessionalListing};

/// Mock implementation of [`ProListingRepository`].
///
/// Holds a fixed set of listings, applies the category filter the way the
/// SQLite repository does, and records every query for assertions. Listings
/// are returned in insertion order; visibility flags are not re-checked so
/// tests can see exactly what the repository handed over.
#[derive(Debug, Default)]
pub struct MockListingRepository {
    listings: Arc<RwLock<Vec<ProfessionalListing>>>,
    queries: Arc<RwLock<Vec<ListingQuery>>>,
    next_error: Arc<RwLock<Option<ListingError>>>,
}

impl MockListingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored listings.
    pub async fn set_listings(&self, listings: Vec<ProfessionalListing>) {
        *self.listings.write().await = listings;
    }

    /// Make the next search fail with `error`.
    pub async fn set_next_error(&self, error: ListingError) {
        *self.next_error.write().await = Some(error);
    }

    /// Queries received so far, oldest first.
    pub async fn recorded_queries(&self) -> Vec<ListingQuery> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl ProListingRepository for MockListingRepository {
    async fn search_pros(
        &self,
        query: &ListingQuery,
    ) -> Result<Vec<ProfessionalListing>, ListingError> {
        self.queries.write().await.push(query.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let listings = self.listings.read().await;
        Ok(listings
            .iter()
            .filter(|listing| match &query.category_id {
                Some(category_id) => listing.category_ids.contains(category_id),
                None => true,
            })
            .cloned()
            .collect())
    }
}
