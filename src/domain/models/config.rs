use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for the escalation engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Escalation deadlines
    #[serde(default)]
    pub escalation: EscalationConfig,

    /// Message generator cadence
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Notification bus settings
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Escalation deadline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EscalationConfig {
    /// Delay from creation to the urgent check, in milliseconds
    #[serde(default = "default_urgent_delay_ms")]
    pub urgent_delay_ms: u64,

    /// Delay from becoming urgent to the court check, in milliseconds
    #[serde(default = "default_court_delay_ms")]
    pub court_delay_ms: u64,
}

const fn default_urgent_delay_ms() -> u64 {
    8000
}

const fn default_court_delay_ms() -> u64 {
    8000
}

impl EscalationConfig {
    pub const fn urgent_delay(&self) -> Duration {
        Duration::from_millis(self.urgent_delay_ms)
    }

    pub const fn court_delay(&self) -> Duration {
        Duration::from_millis(self.court_delay_ms)
    }
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            urgent_delay_ms: default_urgent_delay_ms(),
            court_delay_ms: default_court_delay_ms(),
        }
    }
}

/// Generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GeneratorConfig {
    /// Interval between generated messages, in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// How long the welcome message stays on the board, in milliseconds
    #[serde(default = "default_welcome_ttl_ms")]
    pub welcome_ttl_ms: u64,

    /// Seed for source/text selection (random if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

const fn default_interval_ms() -> u64 {
    20_000
}

const fn default_welcome_ttl_ms() -> u64 {
    30_000
}

impl GeneratorConfig {
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub const fn welcome_ttl(&self) -> Duration {
        Duration::from_millis(self.welcome_ttl_ms)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            welcome_ttl_ms: default_welcome_ttl_ms(),
            seed: None,
        }
    }
}

/// Notification bus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NotificationConfig {
    /// Capacity of the broadcast channel; slow subscribers lag past this
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

const fn default_channel_capacity() -> usize {
    256
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Rotation for file logs: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
