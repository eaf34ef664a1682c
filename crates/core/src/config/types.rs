use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::geocoding::HttpGeocoderConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    /// HTTP geocoder. Location filtering is disabled when absent.
    #[serde(default)]
    pub geocoding: Option<HttpGeocoderConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("prodiscovery.db")
}

/// Discovery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    /// The only country whose addresses are geocoded (ISO 3166-1 alpha-2).
    #[serde(default = "default_country")]
    pub supported_country: String,
    /// Country assumed when a search does not name one.
    #[serde(default = "default_country")]
    pub default_country: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            supported_country: default_country(),
            default_country: default_country(),
        }
    }
}

fn default_country() -> String {
    "UY".to_string()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub discovery: DiscoveryConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geocoding: Option<SanitizedGeocodingConfig>,
}

/// Sanitized geocoder config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGeocodingConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            discovery: config.discovery.clone(),
            geocoding: config.geocoding.as_ref().map(|g| SanitizedGeocodingConfig {
                base_url: g.base_url.clone(),
                api_key_configured: g.api_key.as_deref().is_some_and(|k| !k.is_empty()),
                timeout_secs: g.timeout_secs,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_server_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.path.to_str().unwrap(), "prodiscovery.db");
        assert_eq!(config.discovery.supported_country, "UY");
        assert_eq!(config.discovery.default_country, "UY");
        assert!(config.geocoding.is_none());
    }

    #[test]
    fn test_deserialize_wrong_type_fails() {
        let toml = r#"
[server]
port = "eighty"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_with_custom_database_path() {
        let toml = r#"
[database]
path = "/data/my-db.sqlite"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.path.to_str().unwrap(), "/data/my-db.sqlite");
    }

    #[test]
    fn test_deserialize_with_geocoding_config() {
        let toml = r#"
[discovery]
supported_country = "AR"

[geocoding]
base_url = "https://geocoder.example.com/api"
api_key = "test-api-key"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.discovery.supported_country, "AR");
        assert_eq!(config.discovery.default_country, "UY");

        let geocoding = config.geocoding.as_ref().unwrap();
        assert_eq!(geocoding.base_url, "https://geocoder.example.com/api");
        assert_eq!(geocoding.api_key.as_deref(), Some("test-api-key"));
        assert_eq!(geocoding.timeout_secs, 10); // default
    }

    #[test]
    fn test_sanitized_config() {
        let sanitized = SanitizedConfig::from(&Config::default());
        assert_eq!(sanitized.server.port, 8080);
        assert_eq!(sanitized.database.path.to_str().unwrap(), "prodiscovery.db");
        assert!(sanitized.geocoding.is_none());
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let config = Config {
            geocoding: Some(HttpGeocoderConfig {
                base_url: "https://geocoder.example.com/api".to_string(),
                api_key: Some("secret-key".to_string()),
                timeout_secs: 30,
            }),
            ..Config::default()
        };

        let sanitized = SanitizedConfig::from(&config);
        let geocoding = sanitized.geocoding.as_ref().unwrap();
        assert!(geocoding.api_key_configured);
        assert_eq!(geocoding.timeout_secs, 30);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));
    }
}
