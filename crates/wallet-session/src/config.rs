//! # Resolver Configuration
//!
//! Tunables for session resolution, with serde support so hosts can load
//! them from their own config files.

use crate::DEFAULT_EVENT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default corroboration wait for resumed sessions.
pub const DEFAULT_WAIT_FOR_INITIAL_UPDATE: Duration = Duration::from_millis(1000);

/// Configuration errors.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A channel capacity that cannot back a channel.
    #[error("invalid capacity: {0}")]
    InvalidCapacity(String),
}

/// Session resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// How long a resumed session waits for a corroborating session
    /// update before settling on the cached identity. Zero disables the
    /// wait, so resumed sessions settle immediately.
    #[serde(with = "duration_serde")]
    pub wait_for_initial_update: Duration,

    /// Capacity of the per-connection notification channel.
    pub event_capacity: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            wait_for_initial_update: DEFAULT_WAIT_FOR_INITIAL_UPDATE,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ResolverConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_capacity == 0 {
            return Err(ConfigError::InvalidCapacity(
                "event_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// True when resumed sessions should wait for corroboration.
    #[must_use]
    pub fn waits_for_initial_update(&self) -> bool {
        !self.wait_for_initial_update.is_zero()
    }
}

/// Serde for durations in human-friendly units: "1500ms", "2s", "1m".
/// Bare numbers are milliseconds.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }

    fn parse_duration(raw: &str) -> Result<Duration, String> {
        let raw = raw.trim();
        if let Some(millis) = raw.strip_suffix("ms") {
            millis
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| format!("invalid milliseconds: {raw}"))
        } else if let Some(secs) = raw.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| format!("invalid seconds: {raw}"))
        } else if let Some(mins) = raw.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .map(Duration::from_secs)
                .ok_or_else(|| format!("invalid minutes: {raw}"))
        } else {
            raw.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| format!("invalid duration: {raw}"))
        }
    }

}
