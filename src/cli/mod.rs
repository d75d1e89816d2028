//! CLI command handlers for FingerMath.
//!
//! Every subcommand is a clap `Args` struct with an `execute` method;
//! `main.rs` only parses arguments and dispatches.

pub mod config;
pub mod replay;
#[cfg(feature = "web")]
pub mod serve;

use std::path::Path;

use anyhow::Result;

use crate::config::Config as AppConfig;

// Re-export types used by main.rs and tests
pub use config::ConfigArgs;
pub use replay::ReplayArgs;
#[cfg(feature = "web")]
pub use serve::ServeArgs;

/// Loads the configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            AppConfig::load_from(path)
        }
        None => AppConfig::load(),
    }
}
