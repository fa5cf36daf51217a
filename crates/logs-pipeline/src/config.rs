// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;

use collector_core::component::ComponentId;
use collector_core::telemetry::Level;

const DEFAULT_PROCESSOR_ID: &str = "severity_filter";
const MAX_SEVERITY: i32 = 24;
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Configuration for the logs pipeline binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
    /// Records with a lower severity number are dropped
    pub min_severity: i32,
    /// Verbosity of the processor's own metrics
    pub metrics_level: Level,
    /// Identifier the processor reports its metrics under
    pub processor_id: ComponentId,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            min_severity: 0,
            metrics_level: Level::Basic,
            processor_id: ComponentId::new(collector_core::component::Type::must_new(
                DEFAULT_PROCESSOR_ID,
            )),
        }
    }
}

impl PipelineConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from any key lookup, using defaults for missing keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_level = lookup("LOGS_PIPELINE_LOG_LEVEL")
            .map(|val| val.trim().to_lowercase())
            .unwrap_or(defaults.log_level);

        let min_severity = match lookup("LOGS_PIPELINE_MIN_SEVERITY") {
            Some(val) => val.trim().parse::<i32>().map_err(|e| {
                ConfigError::InvalidConfig(format!(
                    "LOGS_PIPELINE_MIN_SEVERITY '{val}' is not a number: {e}"
                ))
            })?,
            None => defaults.min_severity,
        };

        let metrics_level = match lookup("LOGS_PIPELINE_METRICS_LEVEL") {
            Some(val) => val
                .parse::<Level>()
                .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?,
            None => defaults.metrics_level,
        };

        let processor_id = match lookup("LOGS_PIPELINE_PROCESSOR_ID") {
            Some(val) => val.parse::<ComponentId>().map_err(|e| {
                ConfigError::InvalidConfig(format!("LOGS_PIPELINE_PROCESSOR_ID: {e}"))
            })?,
            None => defaults.processor_id,
        };

        let config = Self {
            log_level,
            min_severity,
            metrics_level,
            processor_id,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        if !(0..=MAX_SEVERITY).contains(&self.min_severity) {
            return Err(ConfigError::InvalidConfig(format!(
                "Minimum severity must be between 0 and {MAX_SEVERITY}, got {}",
                self.min_severity
            )));
        }

        Ok(())
    }
}
