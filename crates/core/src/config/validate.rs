use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Country codes are two ASCII letters
/// - Geocoder base URL is http(s) and the timeout is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Discovery validation
    for (key, value) in [
        ("discovery.supported_country", &config.discovery.supported_country),
        ("discovery.default_country", &config.discovery.default_country),
    ] {
        if !is_country_code(value) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a two-letter country code, got {:?}",
                key, value
            )));
        }
    }

    // Geocoding validation
    if let Some(geocoding) = &config.geocoding {
        let url = geocoding.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(
                "geocoding.base_url must be an http(s) URL".to_string(),
            ));
        }
        if geocoding.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "geocoding.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}

fn is_country_code(value: &str) -> bool {
    value.len() == 2 && value.chars().all(|c| c.is_ascii_alphabetic())
}
