//! Professional availability.
//!
//! Discovery only consumes availability through [`AvailabilityMatcher`].
//! Which of the three checks runs depends on whether a date, a time window,
//! or both were requested; see [`AvailabilityCheck`].

mod sqlite;
mod types;

pub use sqlite::{SqliteAvailabilityStore, WeeklySlot};
pub use types::TimeWindow;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur when checking availability.
#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("Invalid time window: {0}")]
    InvalidTimeWindow(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Answers whether a professional can take work at a given date and/or time.
#[async_trait]
pub trait AvailabilityMatcher: Send + Sync {
    /// Whether the professional works at all on `date`.
    async fn is_pro_available_on_day(
        &self,
        pro_id: &str,
        date: NaiveDate,
    ) -> Result<bool, AvailabilityError>;

    /// Whether the professional covers `window` on some day, date-independent.
    async fn is_pro_available_in_time_window_only(
        &self,
        pro_id: &str,
        window: &str,
    ) -> Result<bool, AvailabilityError>;

    /// Whether the professional covers `window` on `date`.
    async fn is_pro_available_in_time_window(
        &self,
        pro_id: &str,
        date: NaiveDate,
        window: &str,
    ) -> Result<bool, AvailabilityError>;
}

/// Which availability check a search asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityCheck {
    Day(NaiveDate),
    WindowOnly(String),
    DayAndWindow(NaiveDate, String),
}

impl AvailabilityCheck {
    /// Select the check for the requested date and window; `None` when
    /// neither is present (everyone counts as available).
    pub fn select(date: Option<NaiveDate>, window: Option<&str>) -> Option<Self> {
        match (date, window) {
            (Some(date), Some(window)) => Some(Self::DayAndWindow(date, window.to_string())),
            (Some(date), None) => Some(Self::Day(date)),
            (None, Some(window)) => Some(Self::WindowOnly(window.to_string())),
            (None, None) => None,
        }
    }

    /// Run this check for a single professional.
    pub async fn run(
        &self,
        matcher: &dyn AvailabilityMatcher,
        pro_id: &str,
    ) -> Result<bool, AvailabilityError> {
        match self {
            Self::Day(date) => matcher.is_pro_available_on_day(pro_id, *date).await,
            Self::WindowOnly(window) => {
                matcher
                    .is_pro_available_in_time_window_only(pro_id, window)
                    .await
            }
            Self::DayAndWindow(date, window) => {
                matcher
                    .is_pro_available_in_time_window(pro_id, *date, window)
                    .await
            }
        }
    }
}
