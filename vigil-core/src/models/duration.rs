//! Serde helpers for `std::time::Duration`.
//!
//! Configuration files spell durations the human way (`"30s"`, `"1m"`,
//! `"250ms"`); a bare integer is taken as seconds. Results are reported
//! with durations as whole milliseconds.

use serde::{Deserialize, Deserializer, Serializer, de};
use std::time::Duration;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(u64),
    Text(String),
}

/// Serializes a duration as a humantime string (e.g. `"1m 30s"`).
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

/// Deserializes a duration from a humantime string or integer seconds.
///
/// # Errors
///
/// Fails when the string is not a valid humantime duration.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match RawDuration::deserialize(deserializer)? {
        RawDuration::Seconds(secs) => Ok(Duration::from_secs(secs)),
        RawDuration::Text(text) => parse(&text).map_err(de::Error::custom),
    }
}

/// Parses a humantime duration, tolerating surrounding whitespace.
///
/// # Errors
///
/// Returns the humantime parse error rendered as a string.
pub fn parse(text: &str) -> Result<Duration, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(trimmed).map_err(|e| format!("invalid duration '{trimmed}': {e}"))
}

/// Whole-millisecond representation used in reported results.
pub mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serializes a duration as integer milliseconds.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    /// Deserializes integer milliseconds into a duration.
    ///
    /// # Errors
    ///
    /// Fails when the value is not an unsigned integer.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
