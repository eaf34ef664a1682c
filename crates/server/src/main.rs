use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prodiscovery_core::{
    load_config, validate_config, AvailabilityMatcher, CategoryQueryResolver, Config,
    GeocodingProvider, HttpGeocoder, LocationResolver, ProListingRepository,
    SearchOrchestrator, SqliteAvailabilityStore, SqliteCategoryStore, SqliteListingRepository,
};
use prodiscovery_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    // Determine config path
    let config_path = std::env::var("PRODISCOVERY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!(
        "Supported country: {}, default country: {}",
        config.discovery.supported_country, config.discovery.default_country
    );

    let orchestrator = build_orchestrator(&config)?;

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), orchestrator));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Initialize logging. `PRODISCOVERY_LOG_FORMAT=json` switches to JSON lines.
fn init_logging() {
    let json = std::env::var("PRODISCOVERY_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

/// Wire the SQLite stores and the optional geocoder into an orchestrator.
fn build_orchestrator(config: &Config) -> Result<SearchOrchestrator> {
    let db_path = &config.database.path;

    // Create SQLite listing repository
    let repository: Arc<dyn ProListingRepository> = Arc::new(
        SqliteListingRepository::new(db_path).context("Failed to create listing repository")?,
    );
    info!("Listing repository initialized");

    // Create SQLite category store
    let categories = Arc::new(
        SqliteCategoryStore::new(db_path).context("Failed to create category store")?,
    );
    info!("Category store initialized");

    // Create SQLite availability store
    let availability: Arc<dyn AvailabilityMatcher> = Arc::new(
        SqliteAvailabilityStore::new(db_path).context("Failed to create availability store")?,
    );
    info!("Availability store initialized");

    // Create geocoder if configured
    let locations = match &config.geocoding {
        Some(geocoding_config) => {
            info!("Initializing HTTP geocoder at {}", geocoding_config.base_url);
            let geocoder: Arc<dyn GeocodingProvider> = Arc::new(
                HttpGeocoder::new(geocoding_config.clone())
                    .context("Failed to create geocoder")?,
            );
            Some(LocationResolver::new(
                geocoder,
                config.discovery.supported_country.clone(),
            ))
        }
        None => {
            info!("No geocoder configured, location filtering disabled");
            None
        }
    };

    Ok(SearchOrchestrator::new(
        repository,
        CategoryQueryResolver::new(categories),
        availability,
        locations,
        config.discovery.default_country.clone(),
    ))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
