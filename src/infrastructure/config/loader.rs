use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid urgent_delay_ms: {0}. Must be at least 1")]
    InvalidUrgentDelay(u64),

    #[error("Invalid court_delay_ms: {0}. Must be at least 1")]
    InvalidCourtDelay(u64),

    #[error("Invalid generator interval_ms: {0}. Must be at least 1")]
    InvalidInterval(u64),

    #[error("Invalid welcome_ttl_ms: {0}. Must be at least 1")]
    InvalidWelcomeTtl(u64),

    #[error("Invalid channel_capacity: {0}. Must be at least 1")]
    InvalidChannelCapacity(usize),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .courtroom/config.yaml (project config)
    /// 3. .courtroom/local.yaml (local overrides, optional)
    /// 4. Environment variables (COURTROOM_* prefix, `__` separates nested keys)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".courtroom/config.yaml"))
            .merge(Yaml::file(".courtroom/local.yaml"))
            .merge(Env::prefixed("COURTROOM_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("COURTROOM_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.escalation.urgent_delay_ms == 0 {
            return Err(ConfigError::InvalidUrgentDelay(
                config.escalation.urgent_delay_ms,
            ));
        }

        if config.escalation.court_delay_ms == 0 {
            return Err(ConfigError::InvalidCourtDelay(
                config.escalation.court_delay_ms,
            ));
        }

        if config.generator.interval_ms == 0 {
            return Err(ConfigError::InvalidInterval(config.generator.interval_ms));
        }

        if config.generator.welcome_ttl_ms == 0 {
            return Err(ConfigError::InvalidWelcomeTtl(
                config.generator.welcome_ttl_ms,
            ));
        }

        if config.notifications.channel_capacity == 0 {
            return Err(ConfigError::InvalidChannelCapacity(
                config.notifications.channel_capacity,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }
}
