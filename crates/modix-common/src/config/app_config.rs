//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use chrono::Duration;
use modix_core::DEFAULT_CAMPAIGN_ACCEPT_COOLDOWN_HOURS;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    /// Absent when the host runs on the in-memory store
    pub database: Option<DatabaseConfig>,
    pub promotions: PromotionConfig,
    pub bus: BusConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Longest accept cooldown the configuration accepts (ten years)
pub const MAX_ACCEPT_COOLDOWN_HOURS: i64 = 24 * 365 * 10;

/// Promotion campaign settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PromotionConfig {
    /// Minimum campaign age before an unforced close
    #[serde(default = "default_accept_cooldown_hours")]
    pub accept_cooldown_hours: i64,
    /// Messages scanned per channel when re-deriving dialog locations
    #[serde(default = "default_dialog_scan_limit")]
    pub dialog_scan_limit: usize,
}

impl PromotionConfig {
    #[must_use]
    pub fn accept_cooldown(&self) -> Duration {
        Duration::hours(
            self.accept_cooldown_hours
                .clamp(0, MAX_ACCEPT_COOLDOWN_HOURS),
        )
    }
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            accept_cooldown_hours: default_accept_cooldown_hours(),
            dialog_scan_limit: default_dialog_scan_limit(),
        }
    }
}

/// Notification bus settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BusConfig {
    /// Events buffered per subscriber before it lags
    #[serde(default = "default_bus_buffer")]
    pub buffer: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            buffer: default_bus_buffer(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "modix".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_accept_cooldown_hours() -> i64 {
    DEFAULT_CAMPAIGN_ACCEPT_COOLDOWN_HOURS
}

fn default_dialog_scan_limit() -> usize {
    100
}

fn default_bus_buffer() -> usize {
    1024
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app = AppSettings {
            name: lookup("APP_NAME").unwrap_or_else(default_app_name),
            env: match lookup("APP_ENV") {
                Some(raw) => Environment::parse(&raw)
                    .ok_or(ConfigError::InvalidValue("APP_ENV", raw))?,
                None => Environment::default(),
            },
        };

        let database = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: parse_or(&lookup, "DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            }),
            None => None,
        };

        let promotions = PromotionConfig {
            accept_cooldown_hours: parse_or(
                &lookup,
                "PROMOTION_ACCEPT_COOLDOWN_HOURS",
                default_accept_cooldown_hours,
            )?,
            dialog_scan_limit: parse_or(&lookup, "PROMOTION_DIALOG_SCAN_LIMIT", default_dialog_scan_limit)?,
        };
        if !(0..=MAX_ACCEPT_COOLDOWN_HOURS).contains(&promotions.accept_cooldown_hours) {
            return Err(ConfigError::InvalidValue(
                "PROMOTION_ACCEPT_COOLDOWN_HOURS",
                promotions.accept_cooldown_hours.to_string(),
            ));
        }

        let bus = BusConfig {
            buffer: parse_or(&lookup, "BUS_BUFFER", default_bus_buffer)?,
        };
        if bus.buffer == 0 {
            return Err(ConfigError::InvalidValue("BUS_BUFFER", "0".to_string()));
        }

        Ok(Self {
            app,
            database,
            promotions,
            bus,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: fn() -> T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
