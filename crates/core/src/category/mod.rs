//! Category resolution from free text.
//!
//! Free text is matched against subcategories first and categories second,
//! using plain lexeme ranking, prefix ranking and trigram similarity with a
//! 2:2:1 weighting. The store abstraction lets the ranking run inside the
//! database; [`SqliteCategoryStore`] registers the ranking functions from
//! [`text`] with SQLite.

mod resolver;
mod sqlite;
pub mod text;
mod types;

pub use resolver::{CategoryQueryResolver, TYPEAHEAD_MAX_RESULTS};
pub use sqlite::{CategoryRecord, SqliteCategoryStore, SubcategoryRecord};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when querying the category text store.
#[derive(Debug, Error)]
pub enum CategoryStoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid category data: {0}")]
    InvalidData(String),
}

/// Ranked text search over active, non-deleted categories and subcategories.
///
/// Implementations return only rows satisfying the match predicate, ordered
/// by descending combined score.
#[async_trait]
pub trait CategoryTextStore: Send + Sync {
    /// Ranked subcategory matches (parent category included in each row).
    async fn match_subcategories(
        &self,
        query: &TextQuery,
        limit: u32,
    ) -> Result<Vec<SubcategoryMatch>, CategoryStoreError>;

    /// Ranked category matches.
    async fn match_categories(
        &self,
        query: &TextQuery,
        limit: u32,
    ) -> Result<Vec<CategoryMatch>, CategoryStoreError>;
}
