pub mod availability;
pub mod category;
pub mod config;
pub mod discovery;
pub mod geocoding;
pub mod listing;
pub mod metrics;
pub mod ranking;
pub mod testing;

pub use availability::{
    AvailabilityCheck, AvailabilityError, AvailabilityMatcher, SqliteAvailabilityStore,
    TimeWindow, WeeklySlot,
};
pub use category::{
    CategoryQueryResolver, CategorySearchResults, CategoryStoreError, CategorySuggestion,
    CategoryTextStore, ResolvedQuery, SqliteCategoryStore, SubcategorySuggestion,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DiscoveryConfig,
    SanitizedConfig,
};
pub use discovery::{SearchError, SearchFilters, SearchOrchestrator};
pub use geocoding::{
    GeoPoint, GeocodingError, GeocodingProvider, HttpGeocoder, HttpGeocoderConfig,
    LocationInput, LocationResolver,
};
pub use listing::{
    ListingError, ListingQuery, ProListingRepository, ProfessionalListing,
    SqliteListingRepository,
};
