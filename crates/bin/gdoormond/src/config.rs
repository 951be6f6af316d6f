//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `gdoormon.toml` in the working directory. Every field except the
//! subscription password has a sensible default so the file is optional.
//! Environment variables take precedence over file values.

use std::time::Duration;

use gdoormon_app::alert_machine::AlertConfig;
use gdoormon_app::timer::MAX_DELAY;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// State machine timeouts.
    pub alert: AlertSection,
    /// Chat command settings.
    pub chat: ChatConfig,
    /// Sensor polling.
    pub sensors: SensorsConfig,
    /// Integration toggles.
    pub integrations: IntegrationsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
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

/// Timeouts, in seconds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AlertSection {
    /// Door may stay open this long while someone is home.
    pub door_open_timeout_secs: u64,
    /// Subscribers get this long to react before the door is closed.
    pub alert_timeout_secs: u64,
    /// Used by `snooze` without an argument.
    pub default_snooze_secs: u64,
}

/// Chat command configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Shared secret for `subscribe <password>`.
    pub password: String,
}

/// Sensor polling configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    /// Seconds between two readings of each sensor.
    pub poll_interval_secs: u64,
}

/// Per-integration toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Poll the simulated garage and let it close its own door.
    pub virtual_enabled: bool,
}

impl Config {
    /// Load configuration from `gdoormon.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("gdoormon.toml")?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
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

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("GDOORMON_HOST") {
            self.server.host = val;
        }
        if let Some(val) = var("GDOORMON_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Some(val) = var("GDOORMON_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("GDOORMON_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("GDOORMON_PASSWORD") {
            self.chat.password = val;
        }
        if let Some(val) = var("GDOORMON_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.chat.password.is_empty() {
            return Err(ConfigError::Validation(
                "chat.password (or GDOORMON_PASSWORD) must be set".to_string(),
            ));
        }
        for (name, value) in [
            ("alert.door_open_timeout_secs", self.alert.door_open_timeout_secs),
            ("alert.alert_timeout_secs", self.alert.alert_timeout_secs),
            ("sensors.poll_interval_secs", self.sensors.poll_interval_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!("{name} must be non-zero")));
            }
        }
        for (name, value) in [
            ("alert.door_open_timeout_secs", self.alert.door_open_timeout_secs),
            ("alert.alert_timeout_secs", self.alert.alert_timeout_secs),
            ("alert.default_snooze_secs", self.alert.default_snooze_secs),
            ("sensors.poll_interval_secs", self.sensors.poll_interval_secs),
        ] {
            if value > MAX_DELAY.as_secs() {
                return Err(ConfigError::Validation(format!(
                    "{name} must be at most {} (one year)",
                    MAX_DELAY.as_secs()
                )));
            }
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    #[must_use]
    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            door_open_timeout: Duration::from_secs(self.alert.door_open_timeout_secs),
            alert_timeout: Duration::from_secs(self.alert.alert_timeout_secs),
        }
    }

    #[must_use]
    pub fn default_snooze(&self) -> Duration {
        Duration::from_secs(self.alert.default_snooze_secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.sensors.poll_interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:gdoormon.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "gdoormond=info,gdoormon=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for AlertSection {
    fn default() -> Self {
        Self {
            door_open_timeout_secs: 10 * 60,
            alert_timeout_secs: 5 * 60,
            default_snooze_secs: 20 * 60,
        }
    }
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            virtual_enabled: true,
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
