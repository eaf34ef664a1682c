//! SQLite-backed listing repository.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{ListingError, ListingQuery, ProListingRepository, ProfessionalListing};

/// SQLite-backed professional listing repository.
pub struct SqliteListingRepository {
    conn: Mutex<Connection>,
}

impl SqliteListingRepository {
    /// Open (or create) the listing database at `path`.
    pub fn new(path: &Path) -> Result<Self, ListingError> {
        let conn = Connection::open(path).map_err(|e| ListingError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory repository (useful for testing).
    pub fn in_memory() -> Result<Self, ListingError> {
        let conn =
            Connection::open_in_memory().map_err(|e| ListingError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), ListingError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS pros (
                id TEXT PRIMARY KEY,
                base_latitude REAL,
                base_longitude REAL,
                service_radius_km REAL,
                is_top_pro INTEGER NOT NULL DEFAULT 0,
                rating REAL,
                completed_jobs_count INTEGER,
                is_approved INTEGER NOT NULL DEFAULT 0,
                is_suspended INTEGER NOT NULL DEFAULT 0,
                profile_complete INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_pros_visible
                ON pros(is_approved, is_suspended, profile_complete);

            CREATE TABLE IF NOT EXISTS pro_categories (
                pro_id TEXT NOT NULL REFERENCES pros(id) ON DELETE CASCADE,
                category_id TEXT NOT NULL,
                PRIMARY KEY (pro_id, category_id)
            );

            CREATE INDEX IF NOT EXISTS idx_pro_categories_category
                ON pro_categories(category_id);
            "#,
        )
        .map_err(|e| ListingError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ListingError> {
        self.conn
            .lock()
            .map_err(|_| ListingError::Database("connection lock poisoned".to_string()))
    }

    /// Insert or replace a listing together with its category memberships.
    ///
    /// An existing listing keeps its original `created_at`, so re-saving it
    /// does not move it in the repository order.
    pub fn upsert(&self, listing: &ProfessionalListing) -> Result<(), ListingError> {
        if listing.id.trim().is_empty() {
            return Err(ListingError::InvalidData("listing id is empty".to_string()));
        }

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| ListingError::Database(e.to_string()))?;

        tx.execute(
            "INSERT INTO pros (id, base_latitude, base_longitude, service_radius_km, is_top_pro,
                               rating, completed_jobs_count, is_approved, is_suspended,
                               profile_complete, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                base_latitude = excluded.base_latitude,
                base_longitude = excluded.base_longitude,
                service_radius_km = excluded.service_radius_km,
                is_top_pro = excluded.is_top_pro,
                rating = excluded.rating,
                completed_jobs_count = excluded.completed_jobs_count,
                is_approved = excluded.is_approved,
                is_suspended = excluded.is_suspended,
                profile_complete = excluded.profile_complete",
            params![
                listing.id,
                listing.base_latitude,
                listing.base_longitude,
                listing.service_radius_km,
                listing.is_top_pro,
                listing.rating,
                listing.completed_jobs_count,
                listing.is_approved,
                listing.is_suspended,
                listing.profile_complete,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| ListingError::Database(e.to_string()))?;

        tx.execute(
            "DELETE FROM pro_categories WHERE pro_id = ?1",
            params![listing.id],
        )
        .map_err(|e| ListingError::Database(e.to_string()))?;

        for category_id in &listing.category_ids {
            tx.execute(
                "INSERT INTO pro_categories (pro_id, category_id) VALUES (?1, ?2)",
                params![listing.id, category_id],
            )
            .map_err(|e| ListingError::Database(e.to_string()))?;
        }

        tx.commit()
            .map_err(|e| ListingError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a single listing by id, regardless of visibility.
    pub fn get(&self, id: &str) -> Result<Option<ProfessionalListing>, ListingError> {
        let conn = self.lock()?;
        let listing = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_PROS),
                params![id],
                Self::row_to_listing,
            )
            .optional()
            .map_err(|e| ListingError::Database(e.to_string()))?;

        match listing {
            Some(mut listing) => {
                listing.category_ids = Self::load_categories(&conn, &listing.id)?;
                Ok(Some(listing))
            }
            None => Ok(None),
        }
    }

    fn load_categories(conn: &Connection, pro_id: &str) -> Result<BTreeSet<String>, ListingError> {
        let mut stmt = conn
            .prepare("SELECT category_id FROM pro_categories WHERE pro_id = ?1")
            .map_err(|e| ListingError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![pro_id], |row| row.get::<_, String>(0))
            .map_err(|e| ListingError::Database(e.to_string()))?;

        let mut categories = BTreeSet::new();
        for row in rows {
            categories.insert(row.map_err(|e| ListingError::Database(e.to_string()))?);
        }
        Ok(categories)
    }

    /// Convert a row to a listing (without categories).
    fn row_to_listing(row: &rusqlite::Row) -> rusqlite::Result<ProfessionalListing> {
        Ok(ProfessionalListing {
            id: row.get(0)?,
            category_ids: BTreeSet::new(), // Loaded separately
            base_latitude: row.get(1)?,
            base_longitude: row.get(2)?,
            service_radius_km: row.get(3)?,
            is_top_pro: row.get(4)?,
            rating: row.get(5)?,
            completed_jobs_count: row.get(6)?,
            is_approved: row.get(7)?,
            is_suspended: row.get(8)?,
            profile_complete: row.get(9)?,
        })
    }
}

const SELECT_PROS: &str = "SELECT id, base_latitude, base_longitude, service_radius_km, is_top_pro,
        rating, completed_jobs_count, is_approved, is_suspended, profile_complete
 FROM pros";

#[async_trait]
impl ProListingRepository for SqliteListingRepository {
    async fn search_pros(
        &self,
        query: &ListingQuery,
    ) -> Result<Vec<ProfessionalListing>, ListingError> {
        let conn = self.lock()?;

        let sql = format!(
            "{} p
             WHERE p.is_approved = 1 AND p.is_suspended = 0 AND p.profile_complete = 1
               AND (?1 IS NULL OR EXISTS (
                    SELECT 1 FROM pro_categories pc
                    WHERE pc.pro_id = p.id AND pc.category_id = ?1))
             ORDER BY p.created_at, p.rowid",
            SELECT_PROS
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ListingError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![query.category_id], Self::row_to_listing)
            .map_err(|e| ListingError::Database(e.to_string()))?;

        let mut listings = Vec::new();
        for row in rows {
            listings.push(row.map_err(|e| ListingError::Database(e.to_string()))?);
        }
        for listing in &mut listings {
            listing.category_ids = Self::load_categories(&conn, &listing.id)?;
        }

        debug!(
            category_id = ?query.category_id,
            results = listings.len(),
            "Listing search complete"
        );

        Ok(listings)
    }
}
