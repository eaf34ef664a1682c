//! SQLite-backed category text store.
//!
//! Ranking runs inside SQLite through scalar functions registered on the
//! connection (`fts_rank`, `fts_prefix_rank`, `trigram_similarity`,
//! `combined_score`, `is_match`), so filtering, ordering and limiting happen
//! in one parameterized query per table.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::text::{combined_score, fts_prefix_rank, fts_rank, is_match, trigram_similarity};
use super::{
    CategoryMatch, CategoryStoreError, CategorySuggestion, CategoryTextStore, SubcategoryMatch,
    SubcategorySuggestion, TextQuery,
};

/// A category row as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
    /// Extra search terms (synonyms, trade names).
    #[serde(default)]
    pub keywords: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub deleted: bool,
}

/// A subcategory row as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryRecord {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub deleted: bool,
}

fn default_active() -> bool {
    true
}

const SUBCATEGORY_QUERY: &str = r#"
    SELECT id, name, slug, category_id, category_name, category_slug,
           combined_score(plain_rank, prefix_rank, similarity) AS score
    FROM (
        SELECT s.id, s.name, s.slug,
               c.id AS category_id, c.name AS category_name, c.slug AS category_slug,
               fts_rank(s.name || ' ' || s.slug || ' ' || s.keywords || ' ' || c.name, ?1) AS plain_rank,
               fts_prefix_rank(s.name || ' ' || s.slug || ' ' || s.keywords || ' ' || c.name, ?2) AS prefix_rank,
               trigram_similarity(s.name, ?1) AS similarity
        FROM subcategories s
        JOIN categories c ON c.id = s.category_id
        WHERE s.is_active = 1 AND s.deleted_at IS NULL
          AND c.is_active = 1 AND c.deleted_at IS NULL
    )
    WHERE is_match(plain_rank, prefix_rank, similarity)
    ORDER BY score DESC, name ASC, id ASC
    LIMIT ?3
"#;

const CATEGORY_QUERY: &str = r#"
    SELECT id, name, slug,
           combined_score(plain_rank, prefix_rank, similarity) AS score
    FROM (
        SELECT c.id, c.name, c.slug,
               fts_rank(c.name || ' ' || c.slug || ' ' || c.keywords, ?1) AS plain_rank,
               fts_prefix_rank(c.name || ' ' || c.slug || ' ' || c.keywords, ?2) AS prefix_rank,
               trigram_similarity(c.name, ?1) AS similarity
        FROM categories c
        WHERE c.is_active = 1 AND c.deleted_at IS NULL
    )
    WHERE is_match(plain_rank, prefix_rank, similarity)
    ORDER BY score DESC, name ASC, id ASC
    LIMIT ?3
"#;

/// SQLite-backed category and subcategory store.
pub struct SqliteCategoryStore {
    conn: Mutex<Connection>,
}

impl SqliteCategoryStore {
    /// Open (or create) the category database at `path`.
    pub fn new(path: &Path) -> Result<Self, CategoryStoreError> {
        let conn =
            Connection::open(path).map_err(|e| CategoryStoreError::Database(e.to_string()))?;
        Self::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, CategoryStoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CategoryStoreError::Database(e.to_string()))?;
        Self::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize(conn: &Connection) -> Result<(), CategoryStoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                keywords TEXT NOT NULL DEFAULT '',
                is_active INTEGER NOT NULL DEFAULT 1,
                deleted_at TEXT
            );

            CREATE TABLE IF NOT EXISTS subcategories (
                id TEXT PRIMARY KEY,
                category_id TEXT NOT NULL REFERENCES categories(id),
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                keywords TEXT NOT NULL DEFAULT '',
                is_active INTEGER NOT NULL DEFAULT 1,
                deleted_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_subcategories_category ON subcategories(category_id);
            "#,
        )
        .map_err(|e| CategoryStoreError::Database(e.to_string()))?;

        Self::register_functions(conn).map_err(|e| CategoryStoreError::Database(e.to_string()))
    }

    fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
        let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

        conn.create_scalar_function("fts_rank", 2, flags, |ctx| {
            let document: String = ctx.get(0)?;
            let query: String = ctx.get(1)?;
            Ok(fts_rank(&document, &query))
        })?;

        // A NULL expression means no prefix term survived sanitizing.
        conn.create_scalar_function("fts_prefix_rank", 2, flags, |ctx| {
            let document: String = ctx.get(0)?;
            let expression: Option<String> = ctx.get(1)?;
            Ok(expression
                .map(|e| fts_prefix_rank(&document, &e))
                .unwrap_or(0.0))
        })?;

        conn.create_scalar_function("trigram_similarity", 2, flags, |ctx| {
            let left: String = ctx.get(0)?;
            let right: String = ctx.get(1)?;
            Ok(trigram_similarity(&left, &right))
        })?;

        conn.create_scalar_function("combined_score", 3, flags, |ctx| {
            Ok(combined_score(ctx.get(0)?, ctx.get(1)?, ctx.get(2)?))
        })?;

        conn.create_scalar_function("is_match", 3, flags, |ctx| {
            Ok(is_match(ctx.get(0)?, ctx.get(1)?, ctx.get(2)?))
        })?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CategoryStoreError> {
        self.conn
            .lock()
            .map_err(|_| CategoryStoreError::Database("connection lock poisoned".to_string()))
    }

    /// Insert or replace a category.
    pub fn upsert_category(&self, record: &CategoryRecord) -> Result<(), CategoryStoreError> {
        if record.id.is_empty() || record.slug.is_empty() {
            return Err(CategoryStoreError::InvalidData(
                "category id and slug are required".to_string(),
            ));
        }

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO categories (id, name, slug, keywords, is_active, deleted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, CASE WHEN ?6 THEN datetime('now') ELSE NULL END)",
            params![
                record.id,
                record.name,
                record.slug,
                record.keywords,
                record.is_active,
                record.deleted,
            ],
        )
        .map_err(|e| CategoryStoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// Insert or replace a subcategory.
    pub fn upsert_subcategory(&self, record: &SubcategoryRecord) -> Result<(), CategoryStoreError> {
        if record.id.is_empty() || record.slug.is_empty() {
            return Err(CategoryStoreError::InvalidData(
                "subcategory id and slug are required".to_string(),
            ));
        }

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO subcategories
                (id, category_id, name, slug, keywords, is_active, deleted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, CASE WHEN ?7 THEN datetime('now') ELSE NULL END)",
            params![
                record.id,
                record.category_id,
                record.name,
                record.slug,
                record.keywords,
                record.is_active,
                record.deleted,
            ],
        )
        .map_err(|e| CategoryStoreError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl CategoryTextStore for SqliteCategoryStore {
    async fn match_subcategories(
        &self,
        query: &TextQuery,
        limit: u32,
    ) -> Result<Vec<SubcategoryMatch>, CategoryStoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare_cached(SUBCATEGORY_QUERY)
            .map_err(|e| CategoryStoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![query.text, query.prefix_expression, limit],
                |row| {
                    Ok(SubcategoryMatch {
                        subcategory: SubcategorySuggestion {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            slug: row.get(2)?,
                            category_id: row.get(3)?,
                            category_name: row.get(4)?,
                            category_slug: row.get(5)?,
                        },
                        score: row.get(6)?,
                    })
                },
            )
            .map_err(|e| CategoryStoreError::Database(e.to_string()))?;

        let mut matches = Vec::new();
        for row in rows {
            matches.push(row.map_err(|e| CategoryStoreError::Database(e.to_string()))?);
        }

        debug!(query = %query.text, matches = matches.len(), "Subcategory text search");
        Ok(matches)
    }

    async fn match_categories(
        &self,
        query: &TextQuery,
        limit: u32,
    ) -> Result<Vec<CategoryMatch>, CategoryStoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare_cached(CATEGORY_QUERY)
            .map_err(|e| CategoryStoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![query.text, query.prefix_expression, limit],
                |row| {
                    Ok(CategoryMatch {
                        category: CategorySuggestion {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            slug: row.get(2)?,
                        },
                        score: row.get(3)?,
                    })
                },
            )
            .map_err(|e| CategoryStoreError::Database(e.to_string()))?;

        let mut matches = Vec::new();
        for row in rows {
            matches.push(row.map_err(|e| CategoryStoreError::Database(e.to_string()))?);
        }

        debug!(query = %query.text, matches = matches.len(), "Category text search");
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::category::CategoryQueryResolver;

    fn category(id: &str, name: &str, slug: &str, keywords: &str) -> CategoryRecord {
        CategoryRecord {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            keywords: keywords.to_string(),
            is_active: true,
            deleted: false,
        }
    }

    fn subcategory(
        id: &str,
        category_id: &str,
        name: &str,
        slug: &str,
        keywords: &str,
    ) -> SubcategoryRecord {
        SubcategoryRecord {
            id: id.to_string(),
            category_id: category_id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            keywords: keywords.to_string(),
            is_active: true,
            deleted: false,
        }
    }

    fn seeded_store() -> SqliteCategoryStore {
        let store = SqliteCategoryStore::in_memory().unwrap();
        store
            .upsert_category(&category("cat-plumbing", "Plomería", "plomeria", "plomero caños"))
            .unwrap();
        store
            .upsert_category(&category(
                "cat-electric",
                "Electricidad",
                "electricidad",
                "electricista",
            ))
            .unwrap();
        store
            .upsert_subcategory(&subcategory(
                "sub-leaks",
                "cat-plumbing",
                "Fugas y goteras",
                "fugas-goteras",
                "plomero pérdidas",
            ))
            .unwrap();
        store
            .upsert_subcategory(&subcategory(
                "sub-outlets",
                "cat-electric",
                "Enchufes",
                "enchufes",
                "tomacorrientes",
            ))
            .unwrap();
        store
    }

    fn query(text: &str) -> TextQuery {
        TextQuery::new(text).unwrap()
    }

    #[tokio::test]
    async fn test_plain_match_across_name_and_keywords() {
        let store = seeded_store();
        let matches = store
            .match_subcategories(&query("plomero fugas"), 5)
            .await
            .unwrap();

        assert_eq!(matches.len(), 1);
        let top = &matches[0].subcategory;
        assert_eq!(top.slug, "fugas-goteras");
        assert_eq!(top.category_id, "cat-plumbing");
        assert_eq!(top.category_slug, "plomeria");
        assert!(matches[0].score > 0.0);
    }

    #[tokio::test]
    async fn test_prefix_match() {
        let store = seeded_store();
        let matches = store.match_categories(&query("electr"), 5).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].category.id, "cat-electric");
    }

    #[tokio::test]
    async fn test_trigram_match_tolerates_typos() {
        let store = seeded_store();
        let matches = store
            .match_categories(&query("Electrisidad"), 5)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].category.id, "cat-electric");
    }

    #[tokio::test]
    async fn test_accent_insensitive_match() {
        let store = seeded_store();
        let matches = store.match_categories(&query("plomeria"), 5).await.unwrap();
        assert_eq!(matches[0].category.id, "cat-plumbing");
    }

    #[tokio::test]
    async fn test_no_match() {
        let store = seeded_store();
        assert!(store
            .match_categories(&query("jardinería"), 5)
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .match_subcategories(&query("&&"), 5)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_inactive_and_deleted_rows_excluded() {
        let store = seeded_store();
        let mut inactive = category("cat-paint", "Pintura", "pintura", "pintor");
        inactive.is_active = false;
        store.upsert_category(&inactive).unwrap();

        let mut deleted = subcategory("sub-sockets", "cat-electric", "Enchufes nuevos", "enchufes-nuevos", "");
        deleted.deleted = true;
        store.upsert_subcategory(&deleted).unwrap();

        assert!(store
            .match_categories(&query("pintura"), 5)
            .await
            .unwrap()
            .is_empty());

        let outlets = store
            .match_subcategories(&query("enchufes"), 5)
            .await
            .unwrap();
        assert_eq!(outlets.len(), 1);
        assert_eq!(outlets[0].subcategory.id, "sub-outlets");
    }

    #[tokio::test]
    async fn test_subcategory_of_inactive_category_excluded() {
        let store = seeded_store();
        let mut plumbing = category("cat-plumbing", "Plomería", "plomeria", "plomero");
        plumbing.is_active = false;
        store.upsert_category(&plumbing).unwrap();

        assert!(store
            .match_subcategories(&query("fugas"), 5)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_results_ordered_by_score_and_limited() {
        let store = seeded_store();
        store
            .upsert_category(&category(
                "cat-electric-ind",
                "Electricidad industrial trifásica",
                "electricidad-industrial",
                "",
            ))
            .unwrap();

        let matches = store
            .match_categories(&query("electricidad"), 5)
            .await
            .unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].category.id, "cat-electric");
        assert!(matches[0].score >= matches[1].score);

        let limited = store
            .match_categories(&query("electricidad"), 1)
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_stopwords_in_query_still_match_subcategory() {
        let store = seeded_store();
        let matches = store
            .match_subcategories(&query("plomero de fugas"), 5)
            .await
            .unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].subcategory.slug, "fugas-goteras");

        let resolver = CategoryQueryResolver::new(Arc::new(store));
        let resolved = resolver
            .resolve_query("plomero de fugas")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.category_id, "cat-plumbing");
        assert_eq!(resolved.subcategory_slug.as_deref(), Some("fugas-goteras"));
    }

    #[tokio::test]
    async fn test_score_weighs_ranks_twice_the_similarity() {
        let store = seeded_store();
        let text = "electricidad";
        let matches = store.match_categories(&query(text), 5).await.unwrap();
        assert_eq!(matches.len(), 1);

        let document = "Electricidad electricidad electricista";
        let expected = 2.0 * fts_rank(document, text)
            + 2.0 * fts_prefix_rank(document, "electricidad:*")
            + trigram_similarity("Electricidad", text);
        assert!(fts_rank(document, text) > 0.0);
        assert!(
            (matches[0].score - expected).abs() < 1e-9,
            "score {} != {}",
            matches[0].score,
            expected
        );
    }

    #[test]
    fn test_upsert_requires_id_and_slug() {
        let store = SqliteCategoryStore::in_memory().unwrap();
        let result = store.upsert_category(&category("", "Name", "slug", ""));
        assert!(matches!(result, Err(CategoryStoreError::InvalidData(_))));
    }
}
