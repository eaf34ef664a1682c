//! Professional search API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use prodiscovery_core::{
    AvailabilityError, ProfessionalListing, SearchError, SearchFilters, TimeWindow,
};

use super::ErrorResponse;
use crate::metrics::INVALID_SEARCH_REQUESTS;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub category_id: Option<String>,
    pub subcategory: Option<String>,
    /// Free text, resolved to a category.
    pub q: Option<String>,
    /// Date as `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Time window as `HH:MM-HH:MM`.
    pub time_window: Option<String>,
    /// Address to search around.
    pub location: Option<String>,
    /// Country of `location`.
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub pros: Vec<ProfessionalListing>,
    pub count: usize,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(reason: &str, message: String) -> ApiError {
    INVALID_SEARCH_REQUESTS.with_label_values(&[reason]).inc();
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: message }),
    )
}

impl SearchParams {
    /// Convert to search filters, rejecting malformed dates and windows.
    pub fn into_filters(self) -> Result<SearchFilters, ApiError> {
        let date = match self.date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| bad_request("date", format!("Invalid date: {}", raw)))?,
            ),
            _ => None,
        };

        if let Some(raw) = self.time_window.as_deref().map(str::trim) {
            if !raw.is_empty() {
                raw.parse::<TimeWindow>()
                    .map_err(|e| bad_request("time_window", e.to_string()))?;
            }
        }

        Ok(SearchFilters {
            category_id: self.category_id,
            subcategory: self.subcategory,
            free_text_query: self.q,
            date,
            time_window: self.time_window,
            location_address: self.location,
            country_code: self.country,
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/pros/search
///
/// Search professionals by category, free text, availability and location.
pub async fn search_pros(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let filters = params.into_filters()?;
    debug!(?filters, "Pro search request");

    match state.orchestrator().search_pros(filters).await {
        Ok(pros) => Ok(Json(SearchResponse {
            count: pros.len(),
            pros,
        })),
        Err(SearchError::Availability(AvailabilityError::InvalidTimeWindow(message))) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: message }),
        )),
        Err(e) => {
            error!(error = %e, "Pro search failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
