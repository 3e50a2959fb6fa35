//! Configuration management for the `TripFlow` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings. Provider
//! endpoints and API keys are injected through this struct rather than read
//! from ambient process state inside the aggregation code.

use crate::TripFlowError;
use crate::models::TravelCategory;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TripFlow` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripFlowConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Travel-data provider settings
    pub providers: ProvidersConfig,
    /// Summarizer/clarifier upstream settings
    pub upstream: UpstreamConfig,
    /// Email dispatch settings
    pub email: EmailConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Default application settings
    pub defaults: DefaultsConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port the API listens on
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// One configured provider endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEndpoint {
    /// Travel category this endpoint serves
    pub category: TravelCategory,
    /// Search URL for the category
    pub url: String,
}

/// Travel-data provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Shared partner API key, sent as a Bearer token when present
    pub api_key: Option<String>,
    /// Base URL used to derive per-category endpoints when none are listed
    #[serde(default = "default_providers_base_url")]
    pub base_url: String,
    /// Explicit endpoint list; empty means one endpoint per category under
    /// `base_url`
    #[serde(default)]
    pub endpoints: Vec<ProviderEndpoint>,
    /// Shared aggregation deadline in seconds; the per-call abort fires at
    /// the same deadline
    #[serde(default = "default_aggregation_deadline")]
    pub deadline_seconds: u64,
    /// Minimum number of records to display per category (padding target)
    #[serde(default = "default_min_results")]
    pub min_results: usize,
}

impl ProvidersConfig {
    /// The effective endpoint list
    #[must_use]
    pub fn effective_endpoints(&self) -> Vec<ProviderEndpoint> {
        if !self.endpoints.is_empty() {
            return self.endpoints.clone();
        }
        TravelCategory::ALL
            .iter()
            .map(|category| ProviderEndpoint {
                category: *category,
                url: format!("{}/{}", self.base_url.trim_end_matches('/'), category.plural()),
            })
            .collect()
    }
}

/// Summarizer/clarifier upstream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the language-model gateway
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,
    /// Gateway API key
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u64,
    /// Retry attempts for transient summarization failures
    #[serde(default = "default_upstream_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds
    #[serde(default = "default_upstream_base_delay")]
    pub base_delay_ms: u64,
}

/// Email dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// SMTP relay host; when absent, receipts are spooled to disk instead
    pub smtp_relay: Option<String>,
    /// SMTP username
    pub smtp_username: Option<String>,
    /// SMTP password
    pub smtp_password: Option<String>,
    /// From address on outbound mail
    #[serde(default = "default_email_from")]
    pub from_address: String,
    /// Spool directory for the file transport fallback
    #[serde(default = "default_email_spool_dir")]
    pub spool_dir: String,
}

impl EmailConfig {
    /// Whether a full SMTP relay is configured
    #[must_use]
    pub fn smtp_configured(&self) -> bool {
        self.smtp_relay.is_some() && self.smtp_username.is_some() && self.smtp_password.is_some()
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Destination label used when `forceProceed` stands in for a missing
    /// destination
    #[serde(default = "default_placeholder_destination")]
    pub placeholder_destination: String,
    /// Trip duration in days used when `forceProceed` stands in for a
    /// missing duration
    #[serde(default = "default_duration_days")]
    pub default_duration_days: u32,
}

// Default value functions
fn default_server_port() -> u16 {
    8787
}

fn default_providers_base_url() -> String {
    "https://partners.tripflow.example/api".to_string()
}

fn default_aggregation_deadline() -> u64 {
    15
}

fn default_min_results() -> usize {
    5
}

fn default_upstream_base_url() -> String {
    "https://llm-gateway.tripflow.example".to_string()
}

fn default_upstream_timeout() -> u64 {
    30
}

fn default_upstream_max_attempts() -> u32 {
    3
}

fn default_upstream_base_delay() -> u64 {
    600
}

fn default_email_from() -> String {
    "TripFlow <bookings@tripflow.example>".to_string()
}

fn default_email_spool_dir() -> String {
    "./outbox".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_placeholder_destination() -> String {
    "your chosen destination".to_string()
}

fn default_duration_days() -> u32 {
    3
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_providers_base_url(),
            endpoints: Vec::new(),
            deadline_seconds: default_aggregation_deadline(),
            min_results: default_min_results(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            api_key: None,
            timeout_seconds: default_upstream_timeout(),
            max_attempts: default_upstream_max_attempts(),
            base_delay_ms: default_upstream_base_delay(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_relay: None,
            smtp_username: None,
            smtp_password: None,
            from_address: default_email_from(),
            spool_dir: default_email_spool_dir(),
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

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            placeholder_destination: default_placeholder_destination(),
            default_duration_days: default_duration_days(),
        }
    }
}

impl TripFlowConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
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

        // Add environment variable overrides with TRIPFLOW_ prefix
        builder = builder.add_source(
            Environment::with_prefix("TRIPFLOW")
                .separator("_")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripFlowConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripflow").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.providers.base_url.is_empty() {
            self.providers.base_url = default_providers_base_url();
        }
        if self.providers.deadline_seconds == 0 {
            self.providers.deadline_seconds = default_aggregation_deadline();
        }
        if self.providers.min_results == 0 {
            self.providers.min_results = default_min_results();
        }
        if self.upstream.base_url.is_empty() {
            self.upstream.base_url = default_upstream_base_url();
        }
        if self.upstream.max_attempts == 0 {
            self.upstream.max_attempts = default_upstream_max_attempts();
        }
        if self.upstream.base_delay_ms == 0 {
            self.upstream.base_delay_ms = default_upstream_base_delay();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.placeholder_destination.is_empty() {
            self.defaults.placeholder_destination = default_placeholder_destination();
        }
        if self.defaults.default_duration_days == 0 {
            self.defaults.default_duration_days = default_duration_days();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_urls()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.providers.deadline_seconds > 300 {
            return Err(
                TripFlowError::config("Aggregation deadline cannot exceed 300 seconds").into(),
            );
        }

        if self.providers.min_results > 50 {
            return Err(
                TripFlowError::config("Minimum display count cannot exceed 50").into(),
            );
        }

        if self.upstream.max_attempts > 10 {
            return Err(
                TripFlowError::config("Summarizer max attempts cannot exceed 10").into(),
            );
        }

        if self.upstream.timeout_seconds > 300 {
            return Err(
                TripFlowError::config("Upstream timeout cannot exceed 300 seconds").into(),
            );
        }

        Ok(())
    }

    /// Validate endpoint URLs
    fn validate_urls(&self) -> Result<()> {
        for endpoint in self.providers.effective_endpoints() {
            if !endpoint.url.starts_with("http://") && !endpoint.url.starts_with("https://") {
                return Err(TripFlowError::config(format!(
                    "Provider URL for {} must be a valid HTTP or HTTPS URL",
                    endpoint.category.plural()
                ))
                .into());
            }
        }

        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            return Err(TripFlowError::config(
                "Upstream base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripFlowError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripFlowError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TripFlowConfig::default();
        assert_eq!(config.providers.deadline_seconds, 15);
        assert_eq!(config.providers.min_results, 5);
        assert_eq!(config.upstream.max_attempts, 3);
        assert_eq!(config.upstream.base_delay_ms, 600);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.defaults.default_duration_days, 3);
        assert!(config.providers.api_key.is_none());
        assert!(!config.email.smtp_configured());
    }

    #[test]
    fn test_effective_endpoints_derived_from_base_url() {
        let config = TripFlowConfig::default();
        let endpoints = config.providers.effective_endpoints();
        assert_eq!(endpoints.len(), TravelCategory::ALL.len());
        assert!(
            endpoints
                .iter()
                .any(|e| e.category == TravelCategory::Hotel && e.url.ends_with("/hotels"))
        );
    }

    #[test]
    fn test_explicit_endpoints_win_over_base_url() {
        let mut config = TripFlowConfig::default();
        config.providers.endpoints = vec![ProviderEndpoint {
            category: TravelCategory::Hotel,
            url: "https://hotels.partner.example/search".to_string(),
        }];
        let endpoints = config.providers.effective_endpoints();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].url, "https://hotels.partner.example/search");
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TripFlowConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TripFlowConfig::default();
        config.providers.deadline_seconds = 500; // Invalid - too high
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot exceed"));
    }

    #[test]
    fn test_config_validation_bad_endpoint_scheme() {
        let mut config = TripFlowConfig::default();
        config.providers.endpoints = vec![ProviderEndpoint {
            category: TravelCategory::Bus,
            url: "ftp://buses.example".to_string(),
        }];
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("buses"));
    }

    #[test]
    fn test_config_path_generation() {
        let path = TripFlowConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("tripflow"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
