//! Configuration for columns and their operators
//!
//! Replaces process-wide debug flags: every column carries its own
//! `ColumnConfig`, and operators read verbosity from it.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ColumnError, Result};

/// Diagnostic output emitted by column operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// No operator diagnostics
    #[default]
    Quiet,
    /// Per-operator progress events
    Verbose,
    /// Progress plus per-match events
    Debug,
}

impl Verbosity {
    pub fn is_verbose(&self) -> bool {
        *self >= Verbosity::Verbose
    }

    pub fn is_debug(&self) -> bool {
        *self >= Verbosity::Debug
    }
}

/// Column configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Operator diagnostics
    #[serde(default)]
    pub verbosity: Verbosity,

    /// Log elapsed time of relational operators
    #[serde(default)]
    pub time_operations: bool,

    /// Worker threads for parallel selection (0 = auto)
    #[serde(default)]
    pub default_threads: usize,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Quiet,
            time_operations: false,
            default_threads: 0, // auto-detect
        }
    }
}

impl ColumnConfig {
    /// Quiet configuration with verbose diagnostics switched on
    pub fn verbose() -> Self {
        Self {
            verbosity: Verbosity::Verbose,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML or JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ColumnError::InvalidConfig(format!("Failed to read config file: {}", e)))?;

        let config = if path.extension().map_or(false, |ext| ext == "toml") {
            Self::from_toml_str(&content)?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| ColumnError::InvalidConfig(format!("Failed to parse JSON config: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ColumnConfig = toml::from_str(content)
            .map_err(|e| ColumnError::InvalidConfig(format!("Failed to parse TOML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_threads > 1024 {
            return Err(ColumnError::InvalidConfig(format!(
                "default_threads = {} exceeds the limit of 1024",
                self.default_threads
            )));
        }
        Ok(())
    }

    /// Worker count for parallel selection when the caller does not pick one
    pub fn effective_threads(&self) -> usize {
        if self.default_threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.default_threads
        }
    }
}
