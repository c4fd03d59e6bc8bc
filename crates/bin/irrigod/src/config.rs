//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `irrigo.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use irrigo_adapter_mqtt::MqttConfig;
use irrigo_app::Topics;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Broker connection and heartbeat.
    pub mqtt: MqttConfig,
    /// Inbound and outbound topic names.
    pub topics: Topics,
    /// Loop cadences and valve timing.
    pub timing: TimingConfig,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Periodic loops and actuation timing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause between two scheduler cycles, in seconds.
    pub scheduler_interval_secs: u64,
    /// Pause between two status snapshots, in seconds.
    pub status_interval_secs: u64,
    /// Back-off after a failed loop iteration, in seconds.
    pub error_retry_secs: u64,
    /// Pause between main valve and zone writes, in milliseconds.
    pub settle_delay_ms: u64,
}

impl Config {
    /// Load configuration from `irrigo.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("irrigo.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("IRRIGO_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("IRRIGO_MQTT_HOST") {
            self.mqtt.broker_host = val;
        }
        // Logging is not set up yet; an unparsable port is ignored.
        if let Some(port) = var("IRRIGO_MQTT_PORT").and_then(|val| val.parse().ok()) {
            self.mqtt.broker_port = port;
        }
        if let Some(val) = var("IRRIGO_MQTT_CLIENT_ID") {
            self.mqtt.client_id = val;
        }
        if let Some(val) = var("IRRIGO_MQTT_USERNAME") {
            self.mqtt.username = Some(val);
        }
        if let Some(val) = var("IRRIGO_MQTT_PASSWORD") {
            self.mqtt.password = Some(val);
        }
        if let Some(val) = var("IRRIGO_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.broker_port == 0 {
            return Err(ConfigError::Validation(
                "mqtt.broker_port must be non-zero".to_string(),
            ));
        }
        if self.mqtt.client_id.is_empty() {
            return Err(ConfigError::Validation(
                "mqtt.client_id must not be empty".to_string(),
            ));
        }
        if self.mqtt.keep_alive_secs < 5 {
            return Err(ConfigError::Validation(
                "mqtt.keep_alive_secs must be at least 5".to_string(),
            ));
        }
        if self.mqtt.reconnect_delay_secs == 0 {
            return Err(ConfigError::Validation(
                "mqtt.reconnect_delay_secs must be non-zero".to_string(),
            ));
        }
        if self.mqtt.heartbeat_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "mqtt.heartbeat_interval_secs must be non-zero".to_string(),
            ));
        }
        if self.timing.scheduler_interval_secs == 0
            || self.timing.status_interval_secs == 0
            || self.timing.error_retry_secs == 0
        {
            return Err(ConfigError::Validation(
                "timing intervals must be non-zero".to_string(),
            ));
        }
        let topics = [
            &self.topics.zone,
            &self.topics.program,
            &self.topics.notification,
            &self.topics.status,
        ];
        if topics.iter().any(|topic| topic.is_empty()) {
            return Err(ConfigError::Validation("topics must not be empty".to_string()));
        }
        if self.topics.zone == self.topics.program {
            return Err(ConfigError::Validation(
                "topics.zone and topics.program must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl TimingConfig {
    #[must_use]
    pub fn scheduler_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler_interval_secs)
    }

    #[must_use]
    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }

    #[must_use]
    pub fn error_retry(&self) -> Duration {
        Duration::from_secs(self.error_retry_secs)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:irrigo.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "irrigod=info,irrigo=info".to_string(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            scheduler_interval_secs: 10,
            status_interval_secs: 5,
            error_retry_secs: 2,
            settle_delay_ms: 200,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
