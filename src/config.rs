//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution. Every section is
//! optional in the file; missing values fall back to their defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use crate::problems::DEFAULT_MAX_ATTEMPTS;
use crate::recognition::gate::DEFAULT_LOCK_DURATION;
use crate::session::{
    CaptureSize, DetectorOptions, SessionOptions, SessionSettings, DEFAULT_FAILURE_THRESHOLD,
};

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Timing and retry settings of the interaction loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long feedback stays on screen, in milliseconds
    pub lock_duration_ms: u64,
    /// Consecutive wrong answers before the problem is replaced
    pub failure_threshold: u32,
    /// Random draws before the generator falls back to the enumerated set
    pub max_generation_attempts: u32,
    /// Web sessions without a request for this long are dropped, in milliseconds
    pub idle_timeout_ms: u64,
}

/// Default idle timeout of web sessions (five minutes).
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 300_000;

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lock_duration_ms: u64::try_from(DEFAULT_LOCK_DURATION.as_millis()).unwrap_or(1500),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            max_generation_attempts: DEFAULT_MAX_ATTEMPTS,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
        }
    }
}

impl SessionConfig {
    /// Lock window as a [`Duration`].
    #[must_use]
    pub const fn lock_duration(&self) -> Duration {
        Duration::from_millis(self.lock_duration_ms)
    }

    /// Idle timeout of web sessions as a [`Duration`].
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Controller settings derived from this section.
    #[must_use]
    pub const fn settings(&self) -> SessionSettings {
        SessionSettings {
            lock_duration: self.lock_duration(),
            failure_threshold: self.failure_threshold,
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/FingerMath/config.toml`
/// - macOS: `~/Library/Application Support/FingerMath/config.toml`
/// - Windows: `%APPDATA%\FingerMath\config.toml`
///
/// # Validation
///
/// - detector confidences must lie in `0.0..=1.0`
/// - only one hand may be tracked
/// - capture size must be non-zero
/// - lock duration, failure threshold and idle timeout must be positive
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server
    pub server: ServerConfig,
    /// Options passed to the hand detector
    pub detector: DetectorOptions,
    /// Offscreen capture buffer
    pub capture: CaptureSize,
    /// Interaction timing and retries
    pub session: SessionConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    ///
    /// - Linux: `~/.config/FingerMath/`
    /// - macOS: `~/Library/Application Support/FingerMath/`
    /// - Windows: `%APPDATA%\FingerMath\`
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);
        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from the default config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from `path`, falling back to defaults if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Saves configuration to the default config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `path` using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create config directory: {}", dir.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).with_context(|| {
            format!("Failed to write temp config file: {}", temp_path.display())
        })?;

        // Atomic rename
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to rename temp config file to: {}", path.display()))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        let detector = &self.detector;
        if detector.max_num_hands != 1 {
            anyhow::bail!(
                "detector.max_num_hands must be 1, got {}",
                detector.max_num_hands
            );
        }
        for (name, value) in [
            ("min_detection_confidence", detector.min_detection_confidence),
            ("min_tracking_confidence", detector.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("detector.{name} must be between 0.0 and 1.0, got {value}");
            }
        }

        if self.capture.width == 0 || self.capture.height == 0 {
            anyhow::bail!(
                "capture size must be non-zero, got {}x{}",
                self.capture.width,
                self.capture.height
            );
        }

        if self.session.lock_duration_ms == 0 {
            anyhow::bail!("session.lock_duration_ms must be greater than 0");
        }
        if self.session.failure_threshold == 0 {
            anyhow::bail!("session.failure_threshold must be at least 1");
        }
        if self.session.idle_timeout_ms == 0 {
            anyhow::bail!("session.idle_timeout_ms must be greater than 0");
        }

        Ok(())
    }

    /// Everything a new session needs.
    #[must_use]
    pub const fn session_options(&self) -> SessionOptions {
        SessionOptions {
            capture: self.capture,
            detector: self.detector,
            settings: self.session.settings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.capture, CaptureSize::default());
        assert_eq!(config.session.lock_duration_ms, 1500);
        assert_eq!(config.session.failure_threshold, 3);
        assert_eq!(config.session.max_generation_attempts, 1000);
        assert_eq!(config.session.idle_timeout(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[server]\nport = 8080\n\n[session]\nlock_duration_ms = 2000\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.session.lock_duration(), Duration::from_secs(2));
        assert_eq!(config.session.failure_threshold, 3);
        assert_eq!(config.detector, DetectorOptions::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.session.failure_threshold = 5;
        config.detector.model_complexity = 0;
        config.save_to(&path).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::new();
        config.detector.min_detection_confidence = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.detector.max_num_hands = 2;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.capture.width = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.session.lock_duration_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.session.failure_threshold = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.session.idle_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[detector]\nmin_tracking_confidence = -0.1\n").unwrap();
        assert!(Config::load_from(&path).is_err());

        fs::write(&path, "not = [valid").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_session_options_follow_config() {
        let mut config = Config::new();
        config.session.lock_duration_ms = 250;
        config.session.failure_threshold = 2;

        let options = config.session_options();
        assert_eq!(options.settings.lock_duration, Duration::from_millis(250));
        assert_eq!(options.settings.failure_threshold, 2);
        assert_eq!(options.capture, config.capture);
    }
}
