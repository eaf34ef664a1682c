//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Search pipeline (outcomes, duration, candidates per stage)
//! - Category resolution
//! - Location resolution
//! - External services (geocoder)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Search Pipeline Metrics
// =============================================================================

/// Searches total by outcome.
pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("prodiscovery_searches_total", "Total professional searches"),
        &["outcome"], // "ok", "error"
    )
    .unwrap()
});

/// Search duration in seconds.
pub static SEARCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "prodiscovery_search_duration_seconds",
            "Duration of a full search",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Candidates remaining after each pipeline stage.
pub static STAGE_CANDIDATES: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "prodiscovery_stage_candidates",
            "Number of candidates remaining after a pipeline stage",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0]),
        &["stage"], // "repository", "availability", "location"
    )
    .unwrap()
});

/// Availability checks issued per search.
pub static AVAILABILITY_FANOUT: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "prodiscovery_availability_fanout",
            "Number of concurrent availability checks per search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
        &["check"], // "day", "window_only", "day_and_window"
    )
    .unwrap()
});

// =============================================================================
// Resolution Metrics
// =============================================================================

/// Free text resolutions by result.
pub static CATEGORY_RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "prodiscovery_category_resolutions_total",
            "Free text category resolutions",
        ),
        &["result"], // "subcategory", "category", "none"
    )
    .unwrap()
});

/// Location resolutions by result.
pub static LOCATION_RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "prodiscovery_location_resolutions_total",
            "Location resolutions attempted by searches",
        ),
        &["result"], // "resolved", "unresolved", "disabled"
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "prodiscovery_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "prodiscovery_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Search
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(SEARCH_DURATION.clone()),
        Box::new(STAGE_CANDIDATES.clone()),
        Box::new(AVAILABILITY_FANOUT.clone()),
        // Resolution
        Box::new(CATEGORY_RESOLUTIONS.clone()),
        Box::new(LOCATION_RESOLUTIONS.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}
