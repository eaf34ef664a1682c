//! Free text to category resolution.

use std::sync::Arc;

use tracing::debug;

use crate::metrics::CATEGORY_RESOLUTIONS;

use super::{
    CategorySearchResults, CategoryStoreError, CategoryTextStore, ResolvedQuery, TextQuery,
};

/// Upper bound on typeahead results across both tables.
pub const TYPEAHEAD_MAX_RESULTS: u32 = 20;

/// Resolves free text to a category, preferring subcategory matches.
#[derive(Clone)]
pub struct CategoryQueryResolver {
    store: Arc<dyn CategoryTextStore>,
}

impl CategoryQueryResolver {
    pub fn new(store: Arc<dyn CategoryTextStore>) -> Self {
        Self { store }
    }

    /// Resolve `text` to a category (and subcategory slug when one matched).
    ///
    /// Any subcategory match wins over category matches, even a nominally
    /// higher-scoring one. Blank text returns `None` without querying.
    pub async fn resolve_query(
        &self,
        text: &str,
    ) -> Result<Option<ResolvedQuery>, CategoryStoreError> {
        let Some(query) = TextQuery::new(text) else {
            return Ok(None);
        };

        let subcategories = self.store.match_subcategories(&query, 1).await?;
        if let Some(top) = subcategories.into_iter().next() {
            debug!(
                query = %query.text,
                subcategory = %top.subcategory.slug,
                score = top.score,
                "Resolved query to subcategory"
            );
            CATEGORY_RESOLUTIONS.with_label_values(&["subcategory"]).inc();
            return Ok(Some(ResolvedQuery {
                category_id: top.subcategory.category_id,
                subcategory_slug: Some(top.subcategory.slug),
            }));
        }

        let categories = self.store.match_categories(&query, 1).await?;
        let resolved = categories.into_iter().next().map(|top| {
            debug!(
                query = %query.text,
                category = %top.category.slug,
                score = top.score,
                "Resolved query to category"
            );
            ResolvedQuery {
                category_id: top.category.id,
                subcategory_slug: None,
            }
        });

        match resolved {
            Some(_) => CATEGORY_RESOLUTIONS.with_label_values(&["category"]).inc(),
            None => {
                debug!(query = %query.text, "Query did not resolve to a category");
                CATEGORY_RESOLUTIONS.with_label_values(&["none"]).inc();
            }
        }
        Ok(resolved)
    }

    /// Typeahead over both tables.
    ///
    /// The requested limit is capped at [`TYPEAHEAD_MAX_RESULTS`] and split
    /// evenly between the tables, with at least one slot each.
    pub async fn search_categories_and_subcategories(
        &self,
        text: &str,
        limit: u32,
    ) -> Result<CategorySearchResults, CategoryStoreError> {
        let Some(query) = TextQuery::new(text) else {
            return Ok(CategorySearchResults::default());
        };

        let per_table = per_table_limit(limit);
        let (categories, subcategories) = tokio::try_join!(
            self.store.match_categories(&query, per_table),
            self.store.match_subcategories(&query, per_table),
        )?;

        Ok(CategorySearchResults {
            categories: categories
                .into_iter()
                .take(per_table as usize)
                .map(|m| m.category)
                .collect(),
            subcategories: subcategories
                .into_iter()
                .take(per_table as usize)
                .map(|m| m.subcategory)
                .collect(),
        })
    }
}

fn per_table_limit(limit: u32) -> u32 {
    (limit.min(TYPEAHEAD_MAX_RESULTS) / 2).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockCategoryStore, RecordedTextQuery};

    fn resolver_with(store: &Arc<MockCategoryStore>) -> CategoryQueryResolver {
        CategoryQueryResolver::new(Arc::clone(store) as Arc<dyn CategoryTextStore>)
    }

    #[test]
    fn test_per_table_limit() {
        assert_eq!(per_table_limit(0), 1);
        assert_eq!(per_table_limit(1), 1);
        assert_eq!(per_table_limit(5), 2);
        assert_eq!(per_table_limit(10), 5);
        assert_eq!(per_table_limit(20), 10);
        assert_eq!(per_table_limit(500), 10);
    }

    #[tokio::test]
    async fn test_blank_text_does_not_query() {
        let store = Arc::new(MockCategoryStore::new());
        let resolver = resolver_with(&store);

        assert_eq!(resolver.resolve_query("   ").await.unwrap(), None);
        assert!(resolver
            .search_categories_and_subcategories("", 10)
            .await
            .unwrap()
            .is_empty());
        assert!(store.recorded_queries().await.is_empty());
    }

    #[tokio::test]
    async fn test_subcategory_match_wins() {
        let store = Arc::new(MockCategoryStore::new());
        store
            .set_subcategory_matches(vec![fixtures::subcategory_match(
                "cat-plumbing",
                "fugas-goteras",
                0.4,
            )])
            .await;
        store
            .set_category_matches(vec![fixtures::category_match("cat-electric", 9.0)])
            .await;
        let resolver = resolver_with(&store);

        let resolved = resolver.resolve_query(" plomero fugas ").await.unwrap();
        assert_eq!(
            resolved,
            Some(ResolvedQuery {
                category_id: "cat-plumbing".to_string(),
                subcategory_slug: Some("fugas-goteras".to_string()),
            })
        );

        // Category table is never consulted once a subcategory matched
        let queries = store.recorded_queries().await;
        assert_eq!(queries.len(), 1);
        match &queries[0] {
            RecordedTextQuery::Subcategories { query, limit } => {
                assert_eq!(query.text, "plomero fugas");
                assert_eq!(
                    query.prefix_expression.as_deref(),
                    Some("plomero:* & fugas:*")
                );
                assert_eq!(*limit, 1);
            }
            other => panic!("unexpected query: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_falls_back_to_category() {
        let store = Arc::new(MockCategoryStore::new());
        store
            .set_category_matches(vec![
                fixtures::category_match("cat-electric", 0.9),
                fixtures::category_match("cat-plumbing", 0.5),
            ])
            .await;
        let resolver = resolver_with(&store);

        let resolved = resolver.resolve_query("electricista").await.unwrap();
        assert_eq!(
            resolved,
            Some(ResolvedQuery {
                category_id: "cat-electric".to_string(),
                subcategory_slug: None,
            })
        );
        assert_eq!(store.recorded_queries().await.len(), 2);
    }

    #[tokio::test]
    async fn test_no_match_resolves_to_none() {
        let store = Arc::new(MockCategoryStore::new());
        let resolver = resolver_with(&store);
        assert_eq!(resolver.resolve_query("zzz").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let store = Arc::new(MockCategoryStore::new());
        store
            .set_next_error(CategoryStoreError::Database("down".to_string()))
            .await;
        let resolver = resolver_with(&store);

        let result = resolver.resolve_query("plomero").await;
        assert!(matches!(result, Err(CategoryStoreError::Database(_))));
    }

    #[tokio::test]
    async fn test_typeahead_splits_limit() {
        let store = Arc::new(MockCategoryStore::new());
        store
            .set_category_matches(
                (0..15)
                    .map(|i| fixtures::category_match(&format!("cat-{}", i), 1.0))
                    .collect(),
            )
            .await;
        store
            .set_subcategory_matches(
                (0..15)
                    .map(|i| fixtures::subcategory_match("cat-0", &format!("sub-{}", i), 1.0))
                    .collect(),
            )
            .await;
        let resolver = resolver_with(&store);

        let results = resolver
            .search_categories_and_subcategories("pl", 100)
            .await
            .unwrap();
        assert_eq!(results.categories.len(), 10);
        assert_eq!(results.subcategories.len(), 10);
        assert_eq!(results.len(), TYPEAHEAD_MAX_RESULTS as usize);

        let results = resolver
            .search_categories_and_subcategories("pl", 0)
            .await
            .unwrap();
        assert_eq!(results.categories.len(), 1);
        assert_eq!(results.subcategories.len(), 1);
    }
}
