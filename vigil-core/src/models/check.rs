//! Check specification types.
//!
//! A [`CheckSpec`] is built once at startup from configuration and never
//! changes afterwards. Its `name` is the key for everything downstream.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

use super::duration;
use crate::error::CoreError;

/// Interval applied when a check does not set one.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Per-attempt timeout applied when a check does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Expected HTTP status applied when a check does not set one.
pub const DEFAULT_EXPECTED_STATUS: u16 = 200;

// ============================================================================
// Check Kind
// ============================================================================

/// The probe strategy a check uses.
///
/// Unrecognised kinds are kept as [`CheckKind::Other`] rather than rejected,
/// so a typo in one check surfaces as an `Unknown` result for that check
/// instead of stopping the whole monitor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CheckKind {
    /// HTTP GET with an expected status code.
    Http,
    /// Raw TCP connect.
    Tcp,
    /// Cluster control-plane health endpoint.
    ControlPlane,
    /// Anything else, kept verbatim.
    Other(String),
}

impl CheckKind {
    /// Parses a kind name. Matching is case-insensitive.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "http" | "https" => Self::Http,
            "tcp" => Self::Tcp,
            "kubernetes" | "k8s" | "controlplane" | "control-plane" | "control_plane" => {
                Self::ControlPlane
            }
            _ => Self::Other(name.to_string()),
        }
    }

    /// Returns the canonical name used in configuration and output.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Http => "http",
            Self::Tcp => "tcp",
            Self::ControlPlane => "kubernetes",
            Self::Other(name) => name,
        }
    }

    /// Returns true if this kind has a probe strategy.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Returns true if checks of this kind need a non-empty target.
    pub fn requires_target(&self) -> bool {
        matches!(self, Self::Http | Self::Tcp)
    }
}

/// A missing kind is unsupported, with an empty name.
impl Default for CheckKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for CheckKind {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl Serialize for CheckKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CheckKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

// ============================================================================
// Check Spec
// ============================================================================

/// Identity and parameters of one monitored target.
///
/// Zero values for `interval`, `timeout` and `expected_status` mean "unset";
/// [`CheckSpec::with_defaults`] replaces them with the documented defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSpec {
    /// Unique name, the key for all lookups.
    pub name: String,
    /// Which probe strategy to run.
    #[serde(rename = "type", default)]
    pub kind: CheckKind,
    /// Address or URL to probe.
    #[serde(default)]
    pub target: String,
    /// Time between attempts.
    #[serde(default, with = "duration")]
    pub interval: Duration,
    /// Deadline for a single attempt.
    #[serde(default, with = "duration")]
    pub timeout: Duration,
    /// Expected HTTP status (HTTP checks only).
    #[serde(default)]
    pub expected_status: u16,
}

impl CheckSpec {
    /// Creates a spec with default interval, timeout and expected status.
    pub fn new(name: impl Into<String>, kind: CheckKind, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.into(),
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            expected_status: DEFAULT_EXPECTED_STATUS,
        }
    }

    /// Sets the interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the expected HTTP status.
    pub fn with_expected_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    /// Replaces unset (zero) fields with their defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.interval.is_zero() {
            self.interval = DEFAULT_INTERVAL;
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        if self.expected_status == 0 {
            self.expected_status = DEFAULT_EXPECTED_STATUS;
        }
        self
    }

    /// The expected HTTP status, falling back to 200 when unset.
    pub fn expected_status(&self) -> u16 {
        if self.expected_status == 0 {
            DEFAULT_EXPECTED_STATUS
        } else {
            self.expected_status
        }
    }

    /// The per-attempt timeout, falling back to 5s when unset.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }

    /// The interval, falling back to 60s when unset.
    pub fn effective_interval(&self) -> Duration {
        if self.interval.is_zero() {
            DEFAULT_INTERVAL
        } else {
            self.interval
        }
    }

    /// Checks the fields that cannot be defaulted.
    ///
    /// Unsupported kinds pass: they are reported per attempt, not at startup.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSpec`] for an empty name, or an empty
    /// target on a kind that needs one.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::invalid_spec(&self.name, "name must not be empty"));
        }
        if self.kind.requires_target() && self.target.trim().is_empty() {
            return Err(CoreError::invalid_spec(
                &self.name,
                format!("target is required for {} checks", self.kind),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
