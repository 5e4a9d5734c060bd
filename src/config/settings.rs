//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::aedt::design::{DesignSettings, Units};
use crate::aedt::props::SolutionMode;
use crate::error::ConfigError;

/// Accepted log levels.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Design settings.
    #[serde(default)]
    pub design: DesignConfig,

    /// Default units for bare numbers.
    #[serde(default)]
    pub units: Units,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.design.name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Design name must not be empty".to_string(),
            });
        }

        if let Some((quantity, _)) = self.units.entries().into_iter().find(|(_, u)| u.is_empty()) {
            return Err(ConfigError::ValidationError {
                message: format!("Unit for '{quantity}' must not be empty"),
            });
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        Ok(())
    }

    /// Design settings for a new [`ThermalDesign`](crate::aedt::ThermalDesign).
    #[must_use]
    pub fn design_settings(&self) -> DesignSettings {
        DesignSettings {
            name: self.design.name.clone(),
            solution_mode: self.design.solution_mode,
            units: self.units.clone(),
        }
    }
}

/// Design configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesignConfig {
    /// Design name.
    /// Default: "IcepakDesign1"
    #[serde(default = "default_design_name")]
    pub name: String,

    /// Solution mode: "SteadyState" or "Transient".
    #[serde(default)]
    pub solution_mode: SolutionMode,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            name: default_design_name(),
            solution_mode: SolutionMode::default(),
        }
    }
}

fn default_design_name() -> String {
    "IcepakDesign1".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.design_settings(), DesignSettings::default());
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "design": {
                "name": "Enclosure",
                "solution_mode": "Transient"
            },
            "units": {
                "power": "mW",
                "length": "in"
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        let settings = config.design_settings();
        assert_eq!(settings.name, "Enclosure");
        assert_eq!(settings.solution_mode, SolutionMode::Transient);
        assert_eq!(settings.units.power, "mW");
        assert_eq!(settings.units.length, "in");
        assert_eq!(settings.units.temperature, "cel");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_empty_unit() {
        let json = r#"{"units": {"temperature": ""}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn reject_unknown_log_level() {
        let json = r#"{"logging": {"level": "loud"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_solution_mode() {
        let json = r#"{"design": {"solution_mode": "Harmonic"}}"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
