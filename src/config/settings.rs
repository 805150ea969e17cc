//! Application settings loaded from `config.toml`.
//!
//! Every section has defaults, so a missing file or a partial file is fine.
//! A few values can be overridden from the environment after the file is read;
//! secrets (the mail API key) are never part of the file and are read at the
//! point of use instead.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Where records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// Generated in-memory data
    #[default]
    Mock,
    /// The SQLite database behind `DATABASE_URL`
    Database,
}

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Data source selection and mock data generation
    pub data: DataConfig,
    /// Listing defaults
    pub pagination: PaginationConfig,
    /// Outbound e-mail
    pub mail: MailConfig,
    /// Subscription pricing
    pub subscriptions: SubscriptionConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// TCP port, overridden by `PORT`
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Data source settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// `"mock"` or `"database"`
    pub source: DataSourceKind,
    /// Number of generated transactions
    pub mock_transactions: usize,
    /// Number of generated curated dates
    pub mock_dates: usize,
    /// RNG seed for generated data, so restarts show the same records
    pub seed: u64,
    /// Fill empty database tables with generated data on startup
    pub seed_database: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSourceKind::Mock,
            mock_transactions: 150,
            mock_dates: 50,
            seed: 42,
            seed_database: true,
        }
    }
}

/// Listing settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Rows per page when the request does not say
    pub default_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: crate::core::pagination::DEFAULT_PAGE_SIZE,
        }
    }
}

/// Outbound e-mail settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// MailerSend e-mail endpoint
    pub api_url: String,
    /// From address
    pub sender_email: String,
    /// From display name
    pub sender_name: String,
    /// How long a verification code stays valid
    pub code_ttl_minutes: i64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.mailersend.com/v1/email".to_string(),
            sender_email: "noreply@datifyy.com".to_string(),
            sender_name: "Datifyy".to_string(),
            code_ttl_minutes: 5,
        }
    }
}

/// Subscription pricing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Plan price in whole currency units, used for recurring revenue
    pub monthly_price: i64,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self { monthly_price: 999 }
    }
}

/// Parses settings from TOML text.
///
/// # Errors
/// Returns [`Error::Config`] if the TOML is invalid or a value has the wrong type.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads settings from a TOML file
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Returns
/// * `Ok(AppConfig)` - Parsed settings; defaults if the file does not exist
/// * `Err(Error)` - The file exists but could not be read or parsed
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    debug!("Loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_config(&contents)
}

/// Loads settings from `CONFIG_PATH` (default `config.toml`) and applies
/// environment overrides.
pub fn load_from_env() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let mut config = load_config(path)?;
    config.apply_port_override(std::env::var("PORT").ok().as_deref())?;
    Ok(config)
}

impl AppConfig {
    fn validate(&self) -> Result<()> {
        let page_size = self.pagination.default_page_size;
        if page_size == 0 || page_size > crate::core::pagination::MAX_PAGE_SIZE {
            return Err(Error::Config {
                message: format!("pagination.default_page_size must be 1..=100, got {page_size}"),
            });
        }
        if self.mail.code_ttl_minutes <= 0 {
            return Err(Error::Config {
                message: "mail.code_ttl_minutes must be positive".to_string(),
            });
        }
        if self.subscriptions.monthly_price < 0 {
            return Err(Error::Config {
                message: "subscriptions.monthly_price cannot be negative".to_string(),
            });
        }
        Ok(())
    }

    /// Replaces the listen port with `PORT` when it is set.
    fn apply_port_override(&mut self, port: Option<&str>) -> Result<()> {
        if let Some(port) = port {
            self.server.port = port.parse().map_err(|e| Error::Config {
                message: format!("Invalid PORT '{port}': {e}"),
            })?;
        }
        Ok(())
    }
}
