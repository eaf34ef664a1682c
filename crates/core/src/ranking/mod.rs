//! Distance filtering and ranking of listings.
//!
//! Pure functions; nothing here performs I/O.

mod distance;

pub use distance::{distance_km, EARTH_RADIUS_KM};

use std::cmp::Ordering;

use crate::geocoding::GeoPoint;
use crate::listing::ProfessionalListing;

/// Distance from `origin` to a listing's base, if it has finite coordinates.
pub fn distance_to(origin: &GeoPoint, listing: &ProfessionalListing) -> Option<f64> {
    let (lat, lng) = listing.base_coordinates()?;
    Some(distance_km(origin.latitude(), origin.longitude(), lat, lng))
}

/// Keep listings with finite coordinates whose service radius reaches `origin`.
pub fn filter_by_radius(
    listings: Vec<ProfessionalListing>,
    origin: &GeoPoint,
) -> Vec<ProfessionalListing> {
    listings
        .into_iter()
        .filter(|listing| {
            distance_to(origin, listing)
                .is_some_and(|distance| distance <= listing.effective_radius_km())
        })
        .collect()
}

/// Stable sort by distance, then top-pro badge, rating and completed jobs.
///
/// Listings without coordinates sort after every located listing. Ties keep
/// their input order.
pub fn rank(listings: Vec<ProfessionalListing>, origin: &GeoPoint) -> Vec<ProfessionalListing> {
    let mut keyed: Vec<(f64, ProfessionalListing)> = listings
        .into_iter()
        .map(|listing| {
            let distance = distance_to(origin, &listing).unwrap_or(f64::INFINITY);
            (distance, listing)
        })
        .collect();

    // sort_by is stable
    keyed.sort_by(|(da, a), (db, b)| compare(*da, a, *db, b));
    keyed.into_iter().map(|(_, listing)| listing).collect()
}

fn compare(
    distance_a: f64,
    a: &ProfessionalListing,
    distance_b: f64,
    b: &ProfessionalListing,
) -> Ordering {
    distance_a
        .total_cmp(&distance_b)
        .then_with(|| b.is_top_pro.cmp(&a.is_top_pro))
        .then_with(|| b.ranking_rating().total_cmp(&a.ranking_rating()))
        .then_with(|| b.ranking_jobs().cmp(&a.ranking_jobs()))
}
