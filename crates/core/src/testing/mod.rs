//! Testing utilities and mock implementations of the discovery collaborators.
//!
//! Every collaborator trait has a mock here so the orchestrator and the HTTP
//! layer can be exercised without a database or a geocoding provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use prodiscovery_core::testing::{fixtures, MockAvailability, MockListingRepository};
//!
//! let repository = MockListingRepository::new();
//! repository.set_listings(vec![fixtures::pro("pro-1", &["cat-plumbing"])]).await;
//!
//! let availability = MockAvailability::new();
//! availability.set_available("pro-1", false).await;
//! ```

mod mock_availability;
mod mock_category_store;
mod mock_geocoder;
mod mock_listing_repository;

pub use mock_availability::{MockAvailability, RecordedAvailabilityCall};
pub use mock_category_store::{MockCategoryStore, RecordedTextQuery};
pub use mock_geocoder::MockGeocoder;
pub use mock_listing_repository::MockListingRepository;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeSet;

    use crate::category::{
        CategoryMatch, CategorySuggestion, SubcategoryMatch, SubcategorySuggestion,
    };
    use crate::listing::ProfessionalListing;

    /// A publicly visible listing without coordinates or ranking signals.
    pub fn pro(id: &str, category_ids: &[&str]) -> ProfessionalListing {
        ProfessionalListing {
            id: id.to_string(),
            category_ids: category_ids.iter().map(|c| c.to_string()).collect::<BTreeSet<_>>(),
            base_latitude: None,
            base_longitude: None,
            service_radius_km: None,
            is_top_pro: false,
            rating: None,
            completed_jobs_count: None,
            is_approved: true,
            is_suspended: false,
            profile_complete: true,
        }
    }

    /// A visible listing based at the given coordinates.
    pub fn located_pro(
        id: &str,
        latitude: f64,
        longitude: f64,
        service_radius_km: Option<f64>,
    ) -> ProfessionalListing {
        ProfessionalListing {
            base_latitude: Some(latitude),
            base_longitude: Some(longitude),
            service_radius_km,
            ..pro(id, &[])
        }
    }

    /// A category match whose name and slug are derived from the id.
    pub fn category_match(id: &str, score: f64) -> CategoryMatch {
        let slug = id.trim_start_matches("cat-").to_string();
        CategoryMatch {
            category: CategorySuggestion {
                id: id.to_string(),
                name: slug.replace('-', " "),
                slug,
            },
            score,
        }
    }

    /// A subcategory match under `category_id`.
    pub fn subcategory_match(category_id: &str, slug: &str, score: f64) -> SubcategoryMatch {
        let parent = category_match(category_id, score).category;
        SubcategoryMatch {
            subcategory: SubcategorySuggestion {
                id: format!("sub-{}", slug),
                name: slug.replace('-', " "),
                slug: slug.to_string(),
                category_id: parent.id,
                category_name: parent.name,
                category_slug: parent.slug,
            },
            score,
        }
    }
}
