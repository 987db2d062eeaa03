//! Exporter configuration.
//!
//! Loaded once at startup from a YAML file. Device credentials can be
//! overridden with `ARISTA_USERNAME` / `ARISTA_PASSWORD`, which take
//! precedence over the file values.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

/// Environment variable overriding `username`.
pub const USERNAME_ENV: &str = "ARISTA_USERNAME";
/// Environment variable overriding `password`.
pub const PASSWORD_ENV: &str = "ARISTA_PASSWORD";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io(String),
    /// Config file is not valid YAML or has unexpected keys.
    Parse(String),
    /// A value is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config: {}", msg),
            ConfigError::Parse(msg) => write!(f, "config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "config: invalid value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Transport used to reach the eAPI endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    #[default]
    Https,
}

impl Protocol {
    pub fn scheme(self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

/// Exporter configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub username: String,
    pub password: String,
    /// `null` in the file falls back to https.
    #[serde(default)]
    pub protocol: Option<Protocol>,
    /// Per-command timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    #[serde(default)]
    pub loglevel: Option<String>,
    #[serde(default)]
    pub disable_certificate_validation: bool,
    /// Default module list for requests that don't name one.
    #[serde(default)]
    pub module_names: Option<String>,
}

/// Parses a level name, also accepting the Python logging names `warning`
/// and `critical`.
fn parse_log_level(name: &str) -> Option<tracing::Level> {
    match name.to_ascii_lowercase().as_str() {
        "warning" => Some(tracing::Level::WARN),
        "critical" | "fatal" => Some(tracing::Level::ERROR),
        other => other.parse().ok(),
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    9200
}

impl Config {
    /// Reads the config file and applies environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let mut config = Self::from_yaml(&text)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parses and validates a YAML document without touching the environment.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces credentials with values returned by `lookup`, if any.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(username) = lookup(USERNAME_ENV) {
            self.username = username;
        }
        if let Some(password) = lookup(PASSWORD_ENV) {
            self.password = password;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout == 0 {
            return Err(ConfigError::Invalid("timeout must be positive".to_string()));
        }
        if let Some(level) = self.loglevel.as_deref()
            && parse_log_level(level).is_none()
        {
            return Err(ConfigError::Invalid(format!("unknown loglevel '{}'", level)));
        }
        Ok(())
    }

    /// Configured log level, if any.
    pub fn log_level(&self) -> Option<tracing::Level> {
        self.loglevel.as_deref().and_then(parse_log_level)
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol.unwrap_or_default()
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Connection settings shared by every target.
    pub fn device_settings(&self) -> DeviceSettings {
        DeviceSettings {
            username: self.username.clone(),
            password: self.password.clone(),
            protocol: self.protocol(),
            timeout: self.command_timeout(),
            accept_invalid_certs: self.disable_certificate_validation,
        }
    }
}

/// Resolved connection parameters applied to every target.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceSettings {
    pub username: String,
    pub password: String,
    pub protocol: Protocol,
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl fmt::Debug for DeviceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSettings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("protocol", &self.protocol)
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}
