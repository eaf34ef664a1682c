//! Types for professional listings.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Service radius applied when a listing does not declare one.
pub const DEFAULT_SERVICE_RADIUS_KM: f64 = 10.0;

/// A read-only snapshot of a professional's public listing.
///
/// Approval, suspension and profile completeness are enforced by the
/// repository; the flags are carried so callers can inspect them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalListing {
    /// Listing identifier.
    pub id: String,
    /// Categories this professional offers services in.
    #[serde(default)]
    pub category_ids: BTreeSet<String>,
    /// Latitude of the professional's base of operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_latitude: Option<f64>,
    /// Longitude of the professional's base of operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_longitude: Option<f64>,
    /// Maximum distance the professional travels, in km.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_radius_km: Option<f64>,
    /// Whether the professional holds the "top pro" badge.
    #[serde(default)]
    pub is_top_pro: bool,
    /// Average client rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Number of completed jobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_jobs_count: Option<u32>,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default)]
    pub profile_complete: bool,
}

impl ProfessionalListing {
    /// Base coordinates, only when both are present and finite.
    pub fn base_coordinates(&self) -> Option<(f64, f64)> {
        match (self.base_latitude, self.base_longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }

    /// Service radius, falling back to [`DEFAULT_SERVICE_RADIUS_KM`].
    pub fn effective_radius_km(&self) -> f64 {
        self.service_radius_km.unwrap_or(DEFAULT_SERVICE_RADIUS_KM)
    }

    /// Rating used for ranking (absent or non-finite counts as 0).
    pub fn ranking_rating(&self) -> f64 {
        self.rating.filter(|rating| rating.is_finite()).unwrap_or(0.0)
    }

    /// Completed jobs used for ranking (absent counts as 0).
    pub fn ranking_jobs(&self) -> u32 {
        self.completed_jobs_count.unwrap_or(0)
    }
}

/// Filter passed to the listing repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    /// Restrict to professionals offering this category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl ListingQuery {
    pub fn for_category(category_id: Option<String>) -> Self {
        Self { category_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> ProfessionalListing {
        ProfessionalListing {
            id: "pro-1".to_string(),
            category_ids: BTreeSet::new(),
            base_latitude: Some(-34.9),
            base_longitude: Some(-56.2),
            service_radius_km: None,
            is_top_pro: false,
            rating: None,
            completed_jobs_count: None,
            is_approved: true,
            is_suspended: false,
            profile_complete: true,
        }
    }

    #[test]
    fn test_base_coordinates_requires_both_finite() {
        let mut pro = listing();
        assert_eq!(pro.base_coordinates(), Some((-34.9, -56.2)));

        pro.base_longitude = None;
        assert_eq!(pro.base_coordinates(), None);

        pro.base_longitude = Some(f64::NAN);
        assert_eq!(pro.base_coordinates(), None);

        pro.base_longitude = Some(-56.2);
        pro.base_latitude = Some(f64::INFINITY);
        assert_eq!(pro.base_coordinates(), None);
    }

    #[test]
    fn test_ranking_defaults() {
        let pro = listing();
        assert_eq!(pro.effective_radius_km(), DEFAULT_SERVICE_RADIUS_KM);
        assert_eq!(pro.ranking_rating(), 0.0);
        assert_eq!(pro.ranking_jobs(), 0);
    }

    #[test]
    fn test_non_finite_rating_counts_as_absent() {
        let mut pro = listing();
        pro.rating = Some(f64::NAN);
        assert_eq!(pro.ranking_rating(), 0.0);
        pro.rating = Some(f64::INFINITY);
        assert_eq!(pro.ranking_rating(), 0.0);
        pro.rating = Some(4.5);
        assert_eq!(pro.ranking_rating(), 4.5);
    }

    #[test]
    fn test_listing_serializes_camel_case() {
        let json = serde_json::to_value(listing()).unwrap();
        assert_eq!(json["baseLatitude"], -34.9);
        assert!(json.get("rating").is_none());
        assert_eq!(json["isTopPro"], false);
    }
}
