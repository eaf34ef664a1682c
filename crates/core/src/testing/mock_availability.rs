//! Mock availability matcher for testing.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::availability::{AvailabilityError, AvailabilityMatcher};

/// An availability check received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedAvailabilityCall {
    Day {
        pro_id: String,
        date: NaiveDate,
    },
    WindowOnly {
        pro_id: String,
        window: String,
    },
    DayAndWindow {
        pro_id: String,
        date: NaiveDate,
        window: String,
    },
}

/// Mock implementation of [`AvailabilityMatcher`].
///
/// Every professional is available unless configured otherwise. The answer
/// does not depend on which of the three checks is asked.
///
/// # Example
///
/// ```rust,ignore
/// let availability = MockAvailability::new();
/// availability.set_available("pro-2", false).await;
/// availability.set_delay("pro-1", Duration::from_millis(50)).await;
/// ```
#[derive(Debug, Default)]
pub struct MockAvailability {
    answers: Arc<RwLock<HashMap<String, bool>>>,
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    failing: Arc<RwLock<HashMap<String, String>>>,
    calls: Arc<RwLock<Vec<RecordedAvailabilityCall>>>,
}

impl MockAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the answer for a professional.
    pub async fn set_available(&self, pro_id: &str, available: bool) {
        self.answers
            .write()
            .await
            .insert(pro_id.to_string(), available);
    }

    /// Delay the answer for a professional, to shuffle completion order.
    pub async fn set_delay(&self, pro_id: &str, delay: Duration) {
        self.delays.write().await.insert(pro_id.to_string(), delay);
    }

    /// Make every check for a professional fail with a database error.
    pub async fn set_failing(&self, pro_id: &str, message: &str) {
        self.failing
            .write()
            .await
            .insert(pro_id.to_string(), message.to_string());
    }

    /// Checks received so far, in call order.
    pub async fn recorded_calls(&self) -> Vec<RecordedAvailabilityCall> {
        self.calls.read().await.clone()
    }

    async fn answer(
        &self,
        call: RecordedAvailabilityCall,
        pro_id: &str,
    ) -> Result<bool, AvailabilityError> {
        self.calls.write().await.push(call);

        let delay = self.delays.read().await.get(pro_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failing.read().await.get(pro_id) {
            return Err(AvailabilityError::Database(message.clone()));
        }

        Ok(self
            .answers
            .read()
            .await
            .get(pro_id)
            .copied()
            .unwrap_or(true))
    }
}

#[async_trait]
impl AvailabilityMatcher for MockAvailability {
    async fn is_pro_available_on_day(
        &self,
        pro_id: &str,
        date: NaiveDate,
    ) -> Result<bool, AvailabilityError> {
        let call = RecordedAvailabilityCall::Day {
            pro_id: pro_id.to_string(),
            date,
        };
        self.answer(call, pro_id).await
    }

    async fn is_pro_available_in_time_window_only(
        &self,
        pro_id: &str,
        window: &str,
    ) -> Result<bool, AvailabilityError> {
        let call = RecordedAvailabilityCall::WindowOnly {
            pro_id: pro_id.to_string(),
            window: window.to_string(),
        };
        self.answer(call, pro_id).await
    }

    async fn is_pro_available_in_time_window(
        &self,
        pro_id: &str,
        date: NaiveDate,
        window: &str,
    ) -> Result<bool, AvailabilityError> {
        let call = RecordedAvailabilityCall::DayAndWindow {
            pro_id: pro_id.to_string(),
            date,
            window: window.to_string(),
        };
        self.answer(call, pro_id).await
    }
}
