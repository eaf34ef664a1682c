//! Mock category text store for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::category::{
    CategoryMatch, CategoryStoreError, CategoryTextStore, SubcategoryMatch, TextQuery,
};

/// A text query received by the mock, for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedTextQuery {
    Subcategories { query: TextQuery, limit: u32 },
    Categories { query: TextQuery, limit: u32 },
}

/// Mock implementation of [`CategoryTextStore`].
///
/// Returns the configured matches regardless of the query text, truncated to
/// the requested limit. Matches are expected to be configured already ordered
/// by descending score.
#[derive(Debug, Default)]
pub struct MockCategoryStore {
    subcategories: Arc<RwLock<Vec<SubcategoryMatch>>>,
    categories: Arc<RwLock<Vec<CategoryMatch>>>,
    queries: Arc<RwLock<Vec<RecordedTextQuery>>>,
    next_error: Arc<RwLock<Option<CategoryStoreError>>>,
}

impl MockCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_subcategory_matches(&self, matches: Vec<SubcategoryMatch>) {
        *self.subcategories.write().await = matches;
    }

    pub async fn set_category_matches(&self, matches: Vec<CategoryMatch>) {
        *self.categories.write().await = matches;
    }

    /// Make the next store call fail with `error`.
    pub async fn set_next_error(&self, error: CategoryStoreError) {
        *self.next_error.write().await = Some(error);
    }

    /// Queries received so far, oldest first.
    pub async fn recorded_queries(&self) -> Vec<RecordedTextQuery> {
        self.queries.read().await.clone()
    }

    async fn take_error(&self) -> Result<(), CategoryStoreError> {
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CategoryTextStore for MockCategoryStore {
    async fn match_subcategories(
        &self,
        query: &TextQuery,
        limit: u32,
    ) -> Result<Vec<SubcategoryMatch>, CategoryStoreError> {
        self.queries
            .write()
            .await
            .push(RecordedTextQuery::Subcategories {
                query: query.clone(),
                limit,
            });
        self.take_error().await?;

        let matches = self.subcategories.read().await;
        Ok(matches.iter().take(limit as usize).cloned().collect())
    }

    async fn match_categories(
        &self,
        query: &TextQuery,
        limit: u32,
    ) -> Result<Vec<CategoryMatch>, CategoryStoreError> {
        self.queries.write().await.push(RecordedTextQuery::Categories {
            query: query.clone(),
            limit,
        });
        self.take_error().await?;

        let matches = self.categories.read().await;
        Ok(matches.iter().take(limit as usize).cloned().collect())
    }
}
