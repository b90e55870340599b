//! Configuration management.
//!
//! The configuration is a YAML file with process settings and the list of
//! checks. [`Config::load`] reads, defaults and validates it in one step;
//! any failure is fatal at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use vigil_core::{CheckSpec, duration};

use crate::error::StoreError;

/// Config file used when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Log level used when the file does not set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Query-server port used when the file does not set one.
pub const DEFAULT_API_PORT: u16 = 8080;

/// How long shutdown waits for check loops to drain.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Log filter directive (`info`, `debug`, `vigil=trace`, ...).
    #[serde(default)]
    pub log_level: String,
    /// Port the query server listens on.
    #[serde(default)]
    pub api_port: u16,
    /// Grace period for loops to stop on shutdown.
    #[serde(default, with = "duration")]
    pub shutdown_grace: Duration,
    /// Checks to run.
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            api_port: DEFAULT_API_PORT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            checks: Vec::new(),
        }
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    /// Loads, defaults and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or does not validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_yaml(&content)?;
        info!(path = %path.display(), checks = config.checks.len(), "Loaded configuration");
        Ok(config)
    }

    /// Parses, defaults and validates YAML text.
    ///
    /// # Errors
    ///
    /// Fails if the text is not valid YAML for the schema or does not validate.
    pub fn from_yaml(content: &str) -> Result<Self, StoreError> {
        // An empty document deserializes to null.
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };

        let config = config.with_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Replaces unset fields with their defaults, including every check's.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        if self.log_level.trim().is_empty() {
            self.log_level = DEFAULT_LOG_LEVEL.to_string();
        }
        if self.api_port == 0 {
            self.api_port = DEFAULT_API_PORT;
        }
        if self.shutdown_grace.is_zero() {
            self.shutdown_grace = DEFAULT_SHUTDOWN_GRACE;
        }
        self.checks = self.checks.into_iter().map(CheckSpec::with_defaults).collect();
        self
    }

    /// Validates every check and rejects duplicate names.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidCheck`] for a bad check,
    /// [`StoreError::DuplicateCheck`] for a repeated name and
    /// [`StoreError::InvalidConfig`] for a zero port.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.api_port == 0 {
            return Err(StoreError::InvalidConfig("apiPort must be non-zero".to_string()));
        }

        let mut seen = HashSet::new();
        for check in &self.checks {
            check.validate()?;
            if !seen.insert(check.name.as_str()) {
                return Err(StoreError::DuplicateCheck(check.name.clone()));
            }
        }

        debug!(checks = self.checks.len(), "Configuration valid");
        Ok(())
    }

    /// Returns the check with the given name.
    pub fn check(&self, name: &str) -> Option<&CheckSpec> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Renders the effective configuration as YAML.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn to_yaml(&self) -> Result<String, StoreError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
