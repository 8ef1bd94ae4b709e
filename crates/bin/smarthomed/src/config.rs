//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `smarthome.toml` in the working directory, or at the path in
//! `SMARTHOME_CONFIG`. Every field has a default so the file is optional.
//! Environment variables take precedence over file values.
//!
//! Besides settings, the file declares the home to build: devices, rooms,
//! users, which devices sit in which rooms, and operations to run. Entries
//! refer to each other by name.

use std::collections::HashSet;

use serde::Deserialize;
use smarthome_domain::device::DeviceParams;
use smarthome_domain::location::Location;
use smarthome_domain::user::AccessLevel;

const DEFAULT_PATH: &str = "smarthome.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Report rendering.
    pub output: OutputConfig,
    pub users: Vec<UserConfig>,
    pub rooms: Vec<RoomConfig>,
    pub devices: Vec<DeviceConfig>,
    pub assignments: Vec<AssignmentConfig>,
    pub operations: Vec<OperationConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print the JSON report.
    pub pretty: bool,
}

#[derive(Debug, Deserialize)]
pub struct UserConfig {
    pub name: String,
    #[serde(default)]
    pub level: AccessLevel,
}

#[derive(Debug, Deserialize)]
pub struct RoomConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    /// Kind tag, e.g. `light`, `thermostat`, `security`.
    pub kind: String,
    /// Room part of the device location.
    pub room: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub brightness: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub target_temperature: Option<f64>,
    #[serde(default)]
    pub current_temperature: Option<f64>,
}

impl DeviceConfig {
    #[must_use]
    pub fn location(&self) -> Location {
        let location = Location::new(self.room.clone());
        match &self.details {
            Some(details) => location.with_details(details.clone()),
            None => location,
        }
    }

    #[must_use]
    pub fn params(&self) -> DeviceParams {
        DeviceParams {
            brightness: self.brightness,
            color: self.color.clone(),
            target_temperature: self.target_temperature,
            current_temperature: self.current_temperature,
        }
    }
}

/// Put a device (by name) in a room (by name).
#[derive(Debug, Deserialize)]
pub struct AssignmentConfig {
    pub device: String,
    pub room: String,
}

/// Run `op` against a device on behalf of a user, both by name.
#[derive(Debug, Deserialize)]
pub struct OperationConfig {
    pub user: String,
    pub device: String,
    pub op: String,
}

impl Config {
    /// Load configuration from `SMARTHOME_CONFIG` or `smarthome.toml` (if
    /// present), then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if it
    /// fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SMARTHOME_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
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
        if let Some(val) = var("SMARTHOME_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let users = unique_names("user", self.users.iter().map(|u| u.name.as_str()))?;
        let rooms = unique_names("room", self.rooms.iter().map(|r| r.name.as_str()))?;
        let devices = unique_names("device", self.devices.iter().map(|d| d.name.as_str()))?;

        for assignment in &self.assignments {
            require("device", &devices, &assignment.device)?;
            require("room", &rooms, &assignment.room)?;
        }
        for operation in &self.operations {
            require("user", &users, &operation.user)?;
            require("device", &devices, &operation.device)?;
        }
        Ok(())
    }
}

fn unique_names<'a>(
    entity: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<HashSet<&'a str>, ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::Validation(format!("{entity} {name:?} is declared twice")));
        }
    }
    Ok(seen)
}

fn require(entity: &str, declared: &HashSet<&str>, name: &str) -> Result<(), ConfigError> {
    if declared.contains(name) {
        return Ok(());
    }
    Err(ConfigError::Validation(format!("unknown {entity} {name:?}")))
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "smarthomed=info,smarthome_app=info,smarthome_domain=warn".to_string(),
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
