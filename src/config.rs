//! Logger configuration
//!
//! Values normally come from the host's settings; a TOML file with the same
//! field names is accepted too:
//!
//! ```toml
//! debug = false
//! slow_query_threshold_ms = 200.0
//! ui_enabled = true
//! max_events_per_caller = 5000
//! ```

use crate::store::RetentionPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("slow_query_threshold_ms must be a finite value >= 0, got {0}")]
    InvalidThreshold(f64),

    #[error("max_events_per_caller must be >= 1 when set")]
    ZeroRetention,

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings read by the query logger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Report every query at DEBUG severity
    pub debug: bool,

    /// Executions at or above this many milliseconds are reported as WARNING
    pub slow_query_threshold_ms: f64,

    /// Keep events for the monitoring view. When false, only diagnostics run.
    pub ui_enabled: bool,

    /// Per-caller retention cap (None = unbounded)
    pub max_events_per_caller: Option<usize>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            slow_query_threshold_ms: 200.0,
            ui_enabled: true,
            max_events_per_caller: None,
        }
    }
}

impl LoggerConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.slow_query_threshold_ms.is_finite() || self.slow_query_threshold_ms < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.slow_query_threshold_ms));
        }
        if self.max_events_per_caller == Some(0) {
            return Err(ConfigError::ZeroRetention);
        }
        Ok(())
    }

    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy::from_cap(self.max_events_per_caller)
    }
}
