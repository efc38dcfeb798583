//! Top-level Cascade configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    LearningConfig, ObservabilityConfig, PropagationConfig, SimulationConfig, ValidationConfig,
};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub propagation: PropagationConfig,
    pub simulation: SimulationConfig,
    pub learning: LearningConfig,
    pub validation: ValidationConfig,
    pub observability: ObservabilityConfig,
}

impl CascadeConfig {
    /// Load configuration from a TOML string. Missing sections and fields
    /// fall back to compiled defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.propagation;
        check_unit_interval("propagation.min_confidence", p.min_confidence)?;
        if p.min_magnitude.is_nan() || p.min_magnitude < 0.0 {
            return Err(invalid("propagation.min_magnitude", "must be >= 0.0"));
        }
        if p.max_order == 0 {
            return Err(invalid("propagation.max_order", "must be at least 1"));
        }
        check_rate("learning.learning_rate", self.learning.learning_rate)?;
        check_rate(
            "learning.backtest_learning_rate",
            self.learning.backtest_learning_rate,
        )?;
        if self.validation.calibration_bins == 0 {
            return Err(invalid("validation.calibration_bins", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn check_unit_interval(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, "must be between 0.0 and 1.0"))
    }
}

fn check_rate(field: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be in (0.0, 1.0]"))
    }
}
