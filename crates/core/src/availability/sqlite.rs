//! SQLite-backed availability schedules.
//!
//! A professional's availability is a set of weekly slots minus blocked
//! dates. Windows must fit inside a single slot to count as covered.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AvailabilityError, AvailabilityMatcher, TimeWindow};

/// A recurring weekly slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySlot {
    pub weekday: Weekday,
    pub window: TimeWindow,
}

/// SQLite-backed availability store.
pub struct SqliteAvailabilityStore {
    conn: Mutex<Connection>,
}

impl SqliteAvailabilityStore {
    /// Open (or create) the availability database at `path`.
    pub fn new(path: &Path) -> Result<Self, AvailabilityError> {
        let conn =
            Connection::open(path).map_err(|e| AvailabilityError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, AvailabilityError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AvailabilityError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), AvailabilityError> {
        conn.execute_batch(
            r#"
            -- weekday: 0 = Monday .. 6 = Sunday; minutes since midnight
            CREATE TABLE IF NOT EXISTS pro_weekly_slots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                pro_id TEXT NOT NULL,
                weekday INTEGER NOT NULL,
                start_minute INTEGER NOT NULL,
                end_minute INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_pro_weekly_slots_pro ON pro_weekly_slots(pro_id, weekday);

            CREATE TABLE IF NOT EXISTS pro_blocked_dates (
                pro_id TEXT NOT NULL,
                date TEXT NOT NULL,
                PRIMARY KEY (pro_id, date)
            );
            "#,
        )
        .map_err(|e| AvailabilityError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, AvailabilityError> {
        self.conn
            .lock()
            .map_err(|_| AvailabilityError::Database("connection lock poisoned".to_string()))
    }

    /// Add a recurring weekly slot for a professional.
    pub fn add_weekly_slot(&self, pro_id: &str, slot: WeeklySlot) -> Result<(), AvailabilityError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO pro_weekly_slots (pro_id, weekday, start_minute, end_minute)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                pro_id,
                slot.weekday.num_days_from_monday(),
                slot.window.start_minute(),
                slot.window.end_minute(),
            ],
        )
        .map_err(|e| AvailabilityError::Database(e.to_string()))?;
        Ok(())
    }

    /// Mark a date as unavailable for a professional.
    pub fn block_date(&self, pro_id: &str, date: NaiveDate) -> Result<(), AvailabilityError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO pro_blocked_dates (pro_id, date) VALUES (?1, ?2)",
            params![pro_id, date.to_string()],
        )
        .map_err(|e| AvailabilityError::Database(e.to_string()))?;
        Ok(())
    }

    fn is_blocked(conn: &Connection, pro_id: &str, date: NaiveDate) -> Result<bool, AvailabilityError> {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM pro_blocked_dates WHERE pro_id = ?1 AND date = ?2)",
            params![pro_id, date.to_string()],
            |row| row.get(0),
        )
        .map_err(|e| AvailabilityError::Database(e.to_string()))
    }

    /// Whether any slot (optionally restricted to a weekday) covers `window`.
    fn has_slot(
        conn: &Connection,
        pro_id: &str,
        weekday: Option<Weekday>,
        window: Option<&TimeWindow>,
    ) -> Result<bool, AvailabilityError> {
        let (start, end) = window
            .map(|w| (Some(w.start_minute()), Some(w.end_minute())))
            .unwrap_or((None, None));

        conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM pro_weekly_slots
                WHERE pro_id = ?1
                  AND (?2 IS NULL OR weekday = ?2)
                  AND (?3 IS NULL OR start_minute <= ?3)
                  AND (?4 IS NULL OR end_minute >= ?4))",
            params![
                pro_id,
                weekday.map(|d| d.num_days_from_monday()),
                start,
                end
            ],
            |row| row.get(0),
        )
        .map_err(|e| AvailabilityError::Database(e.to_string()))
    }
}

#[async_trait]
impl AvailabilityMatcher for SqliteAvailabilityStore {
    async fn is_pro_available_on_day(
        &self,
        pro_id: &str,
        date: NaiveDate,
    ) -> Result<bool, AvailabilityError> {
        let conn = self.lock()?;
        if Self::is_blocked(&conn, pro_id, date)? {
            debug!(pro_id, %date, "Date blocked");
            return Ok(false);
        }
        Self::has_slot(&conn, pro_id, Some(date.weekday()), None)
    }

    async fn is_pro_available_in_time_window_only(
        &self,
        pro_id: &str,
        window: &str,
    ) -> Result<bool, AvailabilityError> {
        let window: TimeWindow = window.parse()?;
        let conn = self.lock()?;
        Self::has_slot(&conn, pro_id, None, Some(&window))
    }

    async fn is_pro_available_in_time_window(
        &self,
        pro_id: &str,
        date: NaiveDate,
        window: &str,
    ) -> Result<bool, AvailabilityError> {
        let window: TimeWindow = window.parse()?;
        let conn = self.lock()?;
        if Self::is_blocked(&conn, pro_id, date)? {
            debug!(pro_id, %date, "Date blocked");
            return Ok(false);
        }
        Self::has_slot(&conn, pro_id, Some(date.weekday()), Some(&window))
    }
}
