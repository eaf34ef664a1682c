//! Category typeahead API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::error;

use prodiscovery_core::CategorySearchResults;

use super::ErrorResponse;
use crate::state::AppState;

/// Results requested when the caller gives no limit.
const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct CategorySearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// GET /api/v1/categories/search
///
/// Typeahead over categories and subcategories.
pub async fn search_categories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CategorySearchParams>,
) -> Result<Json<CategorySearchResults>, (StatusCode, Json<ErrorResponse>)> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    state
        .orchestrator()
        .categories()
        .search_categories_and_subcategories(&params.q, limit)
        .await
        .map(Json)
        .map_err(|e| {
            error!(error = %e, query = %params.q, "Category search failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })
}
