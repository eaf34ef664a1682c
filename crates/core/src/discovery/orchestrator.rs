//! The search pipeline.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::debug;

use crate::availability::{AvailabilityCheck, AvailabilityMatcher};
use crate::category::CategoryQueryResolver;
use crate::geocoding::{LocationInput, LocationResolver};
use crate::listing::{ListingQuery, ProListingRepository, ProfessionalListing};
use crate::metrics::{
    AVAILABILITY_FANOUT, LOCATION_RESOLUTIONS, SEARCHES_TOTAL, SEARCH_DURATION, STAGE_CANDIDATES,
};
use crate::ranking;

use super::{SearchError, SearchFilters};

/// Composes the discovery collaborators into [`search_pros`](Self::search_pros).
#[derive(Clone)]
pub struct SearchOrchestrator {
    repository: Arc<dyn ProListingRepository>,
    categories: CategoryQueryResolver,
    availability: Arc<dyn AvailabilityMatcher>,
    locations: Option<LocationResolver>,
    default_country: String,
}

impl SearchOrchestrator {
    /// Create an orchestrator. Without a [`LocationResolver`] the location
    /// stage is always skipped.
    pub fn new(
        repository: Arc<dyn ProListingRepository>,
        categories: CategoryQueryResolver,
        availability: Arc<dyn AvailabilityMatcher>,
        locations: Option<LocationResolver>,
        default_country: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            categories,
            availability,
            locations,
            default_country: default_country.into(),
        }
    }

    pub fn categories(&self) -> &CategoryQueryResolver {
        &self.categories
    }

    pub fn default_country(&self) -> &str {
        &self.default_country
    }

    /// Run a search.
    ///
    /// Returns an empty list when nothing matches. Errors only come from a
    /// collaborator that failed on a present input.
    pub async fn search_pros(
        &self,
        filters: SearchFilters,
    ) -> Result<Vec<ProfessionalListing>, SearchError> {
        let start = Instant::now();
        let result = self.run(filters).await;

        let outcome = if result.is_ok() { "ok" } else { "error" };
        SEARCHES_TOTAL.with_label_values(&[outcome]).inc();
        SEARCH_DURATION
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn run(&self, mut filters: SearchFilters) -> Result<Vec<ProfessionalListing>, SearchError> {
        if let Some(text) = filters.query_text().map(str::to_string) {
            if let Some(resolved) = self.categories.resolve_query(&text).await? {
                filters.category_id = Some(resolved.category_id);
                if let Some(slug) = resolved.subcategory_slug {
                    filters.subcategory = Some(slug);
                }
            }
        }

        // The subcategory is not part of the repository filter.
        let query = ListingQuery::for_category(filters.category_id.clone());
        let mut pros = self.repository.search_pros(&query).await?;
        debug!(
            category_id = ?filters.category_id,
            subcategory = ?filters.subcategory,
            candidates = pros.len(),
            "Fetched base candidates"
        );
        observe_stage("repository", pros.len());

        if let Some(check) = AvailabilityCheck::select(filters.date, filters.window()) {
            pros = self.filter_available(pros, &check).await?;
            observe_stage("availability", pros.len());
        }

        if let Some(address) = filters.address() {
            let country = filters.country().unwrap_or(self.default_country.as_str());
            pros = self.apply_location(pros, country, address).await?;
        }

        Ok(pros)
    }

    /// Check every candidate concurrently and keep the available ones in
    /// their original order.
    async fn filter_available(
        &self,
        pros: Vec<ProfessionalListing>,
        check: &AvailabilityCheck,
    ) -> Result<Vec<ProfessionalListing>, SearchError> {
        AVAILABILITY_FANOUT
            .with_label_values(&[check_label(check)])
            .observe(pros.len() as f64);

        let matcher = self.availability.as_ref();
        let checks = pros.iter().enumerate().map(|(index, pro)| async move {
            (index, check.run(matcher, &pro.id).await)
        });
        let results = join_all(checks).await;

        let mut available = vec![false; pros.len()];
        for (index, result) in results {
            available[index] = result?;
        }

        let before = pros.len();
        let kept: Vec<_> = pros
            .into_iter()
            .zip(available)
            .filter_map(|(pro, available)| available.then_some(pro))
            .collect();
        debug!(?check, before, after = kept.len(), "Applied availability filter");
        Ok(kept)
    }

    /// Radius filter and distance ranking around the resolved address.
    /// Left untouched when the address does not resolve.
    async fn apply_location(
        &self,
        pros: Vec<ProfessionalListing>,
        country: &str,
        address: &str,
    ) -> Result<Vec<ProfessionalListing>, SearchError> {
        let Some(locations) = &self.locations else {
            debug!(address, "No geocoder configured, skipping location filter");
            LOCATION_RESOLUTIONS.with_label_values(&["disabled"]).inc();
            return Ok(pros);
        };

        let origin = locations
            .resolve_user_location(country, &LocationInput::new(address))
            .await?;
        let Some(origin) = origin else {
            debug!(address, country, "Location did not resolve, skipping location filter");
            LOCATION_RESOLUTIONS.with_label_values(&["unresolved"]).inc();
            return Ok(pros);
        };
        LOCATION_RESOLUTIONS.with_label_values(&["resolved"]).inc();

        let before = pros.len();
        let ranked = ranking::rank(ranking::filter_by_radius(pros, &origin), &origin);
        debug!(
            latitude = origin.latitude(),
            longitude = origin.longitude(),
            before,
            after = ranked.len(),
            "Applied location filter"
        );
        observe_stage("location", ranked.len());
        Ok(ranked)
    }
}

fn check_label(check: &AvailabilityCheck) -> &'static str {
    match check {
        AvailabilityCheck::Day(_) => "day",
        AvailabilityCheck::WindowOnly(_) => "window_only",
        AvailabilityCheck::DayAndWindow(_, _) => "day_and_window",
    }
}

fn observe_stage(stage: &str, candidates: usize) {
    STAGE_CANDIDATES
        .with_label_values(&[stage])
        .observe(candidates as f64);
}
