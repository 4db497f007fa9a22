//! Configuration for organization and membership management.
//!
//! Configuration is loaded from environment variables with defaults suitable
//! for local development.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// What to do when a write would leave an organization without an admin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastAdminPolicy {
    /// Reject the write with a validation error
    #[default]
    Forbid,
    /// Perform the write and log a warning
    Warn,
    /// Perform the write silently
    Allow,
}

impl LastAdminPolicy {
    /// Get string representation of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forbid => "forbid",
            Self::Warn => "warn",
            Self::Allow => "allow",
        }
    }
}

impl FromStr for LastAdminPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forbid" => Ok(Self::Forbid),
            "warn" => Ok(Self::Warn),
            "allow" => Ok(Self::Allow),
            other => Err(ConfigError::InvalidValue {
                key: "ROSTER_LAST_ADMIN_POLICY".to_string(),
                message: format!("expected forbid, warn or allow, got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for LastAdminPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organization and membership configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Maximum length of organization and team names, in characters.
    pub max_name_length: usize,

    /// Policy applied when removing or demoting the last organization admin.
    pub last_admin_policy: LastAdminPolicy,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            max_name_length: 256,
            last_admin_policy: LastAdminPolicy::Forbid,
        }
    }
}

impl RosterConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ROSTER_MAX_NAME_LENGTH`: Maximum name length (default: 256)
    /// - `ROSTER_LAST_ADMIN_POLICY`: `forbid`, `warn` or `allow` (default: forbid)
    ///
    /// Unparsable values fall back to the default, as does a configuration
    /// that fails [`validate`](Self::validate).
    pub fn from_env() -> Self {
        let default = Self::default();

        let config = Self {
            max_name_length: std::env::var("ROSTER_MAX_NAME_LENGTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_name_length),
            last_admin_policy: std::env::var("ROSTER_LAST_ADMIN_POLICY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.last_admin_policy),
        };
        config.or_default()
    }

    /// Return this configuration if it is valid, otherwise the default.
    pub fn or_default(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(e) => {
                warn!(error = %e, "Invalid roster configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Set the last-admin policy.
    pub fn with_last_admin_policy(mut self, policy: LastAdminPolicy) -> Self {
        self.last_admin_policy = policy;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_name_length == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ROSTER_MAX_NAME_LENGTH".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
