//! Lobby configuration.

use chrono::TimeDelta;
use derive_getters::Getters;
use derive_more::{Display, Error};
use matchbox_rules::DEFAULT_WINDOW;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Tunables for the lobby.
///
/// Every field has a default, so a TOML file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    /// Seconds a participant may wait in the queue before being pruned.
    queue_timeout_secs: u64,

    /// Seconds without activity after which a match is destroyed.
    match_idle_timeout_secs: u64,

    /// Base history window for Erase matches.
    erase_window: usize,
}

fn default_queue_timeout_secs() -> u64 {
    15
}

impl Default for LobbyConfig {
    fn default() -> Self {
        let queue_timeout_secs = default_queue_timeout_secs();
        Self {
            queue_timeout_secs,
            match_idle_timeout_secs: queue_timeout_secs * 10,
            erase_window: DEFAULT_WINDOW,
        }
    }
}

impl LobbyConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a timeout is zero or the window is zero.
    #[instrument]
    pub fn new(
        queue_timeout_secs: u64,
        match_idle_timeout_secs: u64,
        erase_window: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            queue_timeout_secs,
            match_idle_timeout_secs,
            erase_window,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml_str(&content)?;
        info!(
            queue_timeout_secs = config.queue_timeout_secs,
            match_idle_timeout_secs = config.match_idle_timeout_secs,
            erase_window = config.erase_window,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid TOML for this shape
    /// or fails validation.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    #[track_caller]
    fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_timeout_secs == 0 {
            return Err(ConfigError::new("queue_timeout_secs must be positive"));
        }
        if self.match_idle_timeout_secs == 0 {
            return Err(ConfigError::new("match_idle_timeout_secs must be positive"));
        }
        if self.erase_window == 0 {
            return Err(ConfigError::new("erase_window must be at least 1"));
        }
        Ok(())
    }

    /// Queue timeout as a duration.
    pub fn queue_timeout(&self) -> TimeDelta {
        secs(self.queue_timeout_secs)
    }

    /// Match idle timeout as a duration.
    pub fn match_idle_timeout(&self) -> TimeDelta {
        secs(self.match_idle_timeout_secs)
    }
}

fn secs(value: u64) -> TimeDelta {
    i64::try_from(value)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LobbyConfig::default();
        assert_eq!(*config.queue_timeout_secs(), 15);
        assert_eq!(*config.match_idle_timeout_secs(), 150);
        assert_eq!(*config.erase_window(), 6);
        assert_eq!(config.queue_timeout(), TimeDelta::seconds(15));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LobbyConfig::from_toml_str("erase_window = 4\n").expect("valid config");
        assert_eq!(*config.erase_window(), 4);
        assert_eq!(*config.queue_timeout_secs(), 15);
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = LobbyConfig::from_toml_str("erase_window = 0\n").unwrap_err();
        assert!(err.message.contains("erase_window"));
    }

    #[test]
    fn test_unparseable_toml_rejected() {
        let err = LobbyConfig::from_toml_str("queue_timeout_secs = \"soon\"\n").unwrap_err();
        assert!(err.message.starts_with("Failed to parse config"));
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let config = LobbyConfig::new(u64::MAX, 1, 6).expect("valid config");
        assert_eq!(config.queue_timeout(), TimeDelta::MAX);
    }
}
