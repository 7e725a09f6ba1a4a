//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, BusConfig, ConfigError, DatabaseConfig, Environment,
    PromotionConfig, MAX_ACCEPT_COOLDOWN_HOURS,
};
