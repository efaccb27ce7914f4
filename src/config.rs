//! Configuration management for `VenueScout`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::VenueScoutError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenueScoutConfig {
    /// Places provider configuration
    #[serde(default)]
    pub places: PlacesConfig,
    /// Search policy configuration
    #[serde(default)]
    pub search: SearchConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Places provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// Places API key
    pub api_key: Option<String>,
    /// Base URL of the places web service
    #[serde(default = "default_places_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_places_timeout")]
    pub timeout_seconds: u32,
    /// Transport retries for transient failures
    #[serde(default = "default_places_max_retries")]
    pub max_retries: u32,
    /// Successful pages per query
    #[serde(default = "default_page_cap")]
    pub page_cap: u32,
    /// Delay before presenting a next-page cursor
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    /// Delay before retrying a cursor that is not ready yet
    #[serde(default = "default_not_ready_backoff_ms")]
    pub not_ready_backoff_ms: u64,
    #[serde(default = "default_max_not_ready_retries")]
    pub max_not_ready_retries: u32,
}

/// Search policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Radius used when none is given
    #[serde(default = "default_radius_meters")]
    pub default_radius_meters: f64,
    /// Nearby searches above this radius are refused
    #[serde(default = "default_max_radius_km")]
    pub max_radius_km: f64,
    /// Nearby searches below this map zoom are refused
    #[serde(default = "default_min_zoom_level")]
    pub min_zoom_level: u32,
    /// Radius sent with free text searches
    #[serde(default = "default_text_search_radius")]
    pub text_search_radius_meters: f64,
    /// Query categories concurrently instead of one after another
    #[serde(default)]
    pub parallel_categories: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_places_base_url() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}

fn default_places_timeout() -> u32 {
    30
}

fn default_places_max_retries() -> u32 {
    2
}

fn default_page_cap() -> u32 {
    3
}

fn default_page_delay_ms() -> u64 {
    2000
}

fn default_not_ready_backoff_ms() -> u64 {
    1500
}

fn default_max_not_ready_retries() -> u32 {
    5
}

fn default_radius_meters() -> f64 {
    2000.0
}

fn default_max_radius_km() -> f64 {
    5.0
}

fn default_min_zoom_level() -> u32 {
    12
}

fn default_text_search_radius() -> f64 {
    50_000.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_places_base_url(),
            timeout_seconds: default_places_timeout(),
            max_retries: default_places_max_retries(),
            page_cap: default_page_cap(),
            page_delay_ms: default_page_delay_ms(),
            not_ready_backoff_ms: default_not_ready_backoff_ms(),
            max_not_ready_retries: default_max_not_ready_retries(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_meters: default_radius_meters(),
            max_radius_km: default_max_radius_km(),
            min_zoom_level: default_min_zoom_level(),
            text_search_radius_meters: default_text_search_radius(),
            parallel_categories: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl VenueScoutConfig {
    /// Load configuration from `config_path`, or the user config directory
    /// when none is given, with environment overrides on top
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // VENUESCOUT_PLACES__API_KEY -> places.api_key
        builder = builder.add_source(
            Environment::with_prefix("VENUESCOUT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: VenueScoutConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to deserialize configuration from {}", config_file.display()))?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("venuescout").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.places.base_url.is_empty() {
            self.places.base_url = default_places_base_url();
        }
        if self.places.timeout_seconds == 0 {
            self.places.timeout_seconds = default_places_timeout();
        }
        if self.places.page_cap == 0 {
            self.places.page_cap = default_page_cap();
        }
        if self.search.default_radius_meters <= 0.0 {
            self.search.default_radius_meters = default_radius_meters();
        }
        if self.search.text_search_radius_meters <= 0.0 {
            self.search.text_search_radius_meters = default_text_search_radius();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// The key stays optional so the binary can start and report it missing
    pub fn validate_api_key(&self) -> Result<()> {
        if let Some(api_key) = &self.places.api_key {
            if api_key.trim().is_empty() {
                return Err(VenueScoutError::config(
                    "Places API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() < 20 {
                return Err(VenueScoutError::config(
                    "Places API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }

            if api_key.len() > 100 {
                return Err(VenueScoutError::config(
                    "Places API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.places.timeout_seconds > 300 {
            return Err(
                VenueScoutError::config("Places API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.places.max_retries > 10 {
            return Err(VenueScoutError::config("Places API max retries cannot exceed 10").into());
        }

        if self.places.page_delay_ms < default_page_delay_ms() {
            return Err(VenueScoutError::config(format!(
                "Page delay must be at least {} ms, earlier cursors are rejected by the provider",
                default_page_delay_ms()
            ))
            .into());
        }

        if self.places.not_ready_backoff_ms < 1000 {
            return Err(
                VenueScoutError::config("Not-ready backoff must be at least 1000 ms").into(),
            );
        }

        if self.places.page_cap > 3 {
            return Err(VenueScoutError::config(
                "Page cap cannot exceed 3, the provider serves at most three pages",
            )
            .into());
        }

        if self.places.max_not_ready_retries > 20 {
            return Err(
                VenueScoutError::config("Not-ready retries cannot exceed 20 per page").into(),
            );
        }

        if !self.search.max_radius_km.is_finite() || self.search.max_radius_km <= 0.0 {
            return Err(
                VenueScoutError::config("Maximum search radius must be a positive number").into(),
            );
        }

        if self.search.max_radius_km > 50.0 {
            return Err(VenueScoutError::config("Maximum search radius cannot exceed 50 km").into());
        }

        if self.search.min_zoom_level > 21 {
            return Err(VenueScoutError::config("Minimum zoom level cannot exceed 21").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(VenueScoutError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(VenueScoutError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.places.base_url.starts_with("http://")
            && !self.places.base_url.starts_with("https://")
        {
            return Err(VenueScoutError::config(
                "Places API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    const VALID_KEY: &str = "AIzaSyTestKey0123456789abcdef";

    #[test]
    fn test_default_config() {
        let config = VenueScoutConfig::default();
        assert_eq!(
            config.places.base_url,
            "https://maps.googleapis.com/maps/api/place"
        );
        assert_eq!(config.places.timeout_seconds, 30);
        assert_eq!(config.places.page_cap, 3);
        assert_eq!(config.places.page_delay_ms, 2000);
        assert_eq!(config.places.not_ready_backoff_ms, 1500);
        assert_eq!(config.search.max_radius_km, 5.0);
        assert_eq!(config.search.min_zoom_level, 12);
        assert_eq!(config.search.text_search_radius_meters, 50_000.0);
        assert!(!config.search.parallel_categories);
        assert_eq!(config.logging.level, "info");
        assert!(config.places.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_api_key() {
        let mut config = VenueScoutConfig::default();
        config.places.api_key = Some(VALID_KEY.to_string());
        assert!(config.validate_api_key().is_ok());

        config.places.api_key = Some("   ".to_string());
        assert!(config.validate_api_key().is_err());

        config.places.api_key = Some("short".to_string());
        let err = config.validate_api_key().unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = VenueScoutConfig::default();
        config.logging.level = "verbose".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = VenueScoutConfig::default();
        config.places.page_cap = 5;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Page cap"));

        let mut config = VenueScoutConfig::default();
        config.search.max_radius_km = -1.0;
        assert!(config.validate().is_err());
    }

    #[rstest]
    #[case(0, 1500, "Page delay")]
    #[case(1999, 1500, "Page delay")]
    #[case(2000, 0, "Not-ready backoff")]
    fn test_config_validation_pagination_delays(
        #[case] page_delay_ms: u64,
        #[case] not_ready_backoff_ms: u64,
        #[case] expected: &str,
    ) {
        let mut config = VenueScoutConfig::default();
        config.places.page_delay_ms = page_delay_ms;
        config.places.not_ready_backoff_ms = not_ready_backoff_ms;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(expected), "unexpected error: {err}");
    }

    #[test]
    fn test_load_rejects_short_page_delay() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[places]\npage_delay_ms = 0").unwrap();

        let result = VenueScoutConfig::load_from_path(Some(file.path().to_path_buf()));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = VenueScoutConfig::default();
        config.places.base_url = "maps.googleapis.com".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("HTTP or HTTPS"));
    }

    #[test]
    fn test_apply_defaults() {
        let mut config = VenueScoutConfig::default();
        config.places.base_url = String::new();
        config.places.page_cap = 0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(
            config.places.base_url,
            "https://maps.googleapis.com/maps/api/place"
        );
        assert_eq!(config.places.page_cap, 3);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[places]
api_key = "{VALID_KEY}"
page_delay_ms = 2500

[search]
max_radius_km = 8.0
parallel_categories = true
"#
        )
        .unwrap();

        let config = VenueScoutConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.places.api_key.as_deref(), Some(VALID_KEY));
        assert_eq!(config.places.page_delay_ms, 2500);
        // untouched keys keep their defaults
        assert_eq!(config.places.not_ready_backoff_ms, 1500);
        assert_eq!(config.search.max_radius_km, 8.0);
        assert!(config.search.parallel_categories);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nformat = \"xml\"").unwrap();

        let result = VenueScoutConfig::load_from_path(Some(file.path().to_path_buf()));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = VenueScoutConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("venuescout"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
