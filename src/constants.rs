//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the directory used for configuration.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "FingerMath";

/// Name of the per-user configuration directory.
pub const CONFIG_DIR_NAME: &str = "FingerMath";

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
