//! Configuration management CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::load_config;
use crate::config::Config;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Path to a config file instead of the default location
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display the effective configuration
    Show(ConfigShowArgs),
    /// Write a config file with default values
    Init(ConfigInitArgs),
    /// Print the config file location
    Path,
}

/// Display the effective configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Write a config file with default values
#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> Result<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(self.config.as_deref()),
            ConfigCommand::Init(args) => args.execute(&self.target_path()?),
            ConfigCommand::Path => {
                println!("{}", self.target_path()?.display());
                Ok(())
            }
        }
    }

    fn target_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::config_file_path(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self, path: Option<&Path>) -> Result<()> {
        let config = load_config(path).context("Failed to load configuration")?;

        if self.json {
            let json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize configuration to JSON")?;
            println!("{json}");
        } else {
            output_human_readable(&config);
        }

        Ok(())
    }
}

impl ConfigInitArgs {
    /// Execute init command
    pub fn execute(&self, path: &Path) -> Result<()> {
        if path.exists() && !self.force {
            anyhow::bail!(
                "Config file already exists: {} (use --force to overwrite)",
                path.display()
            );
        }

        Config::new()
            .save_to(path)
            .context("Failed to save configuration")?;

        println!("Wrote default configuration to {}", path.display());
        Ok(())
    }
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config) {
    println!("Server:");
    println!("  Address:                  {}:{}", config.server.host, config.server.port);
    println!();
    println!("Detector:");
    println!("  Max hands:                {}", config.detector.max_num_hands);
    println!("  Model complexity:         {}", config.detector.model_complexity);
    println!(
        "  Min detection confidence: {}",
        config.detector.min_detection_confidence
    );
    println!(
        "  Min tracking confidence:  {}",
        config.detector.min_tracking_confidence
    );
    println!();
    println!("Capture:");
    println!(
        "  Size:                     {}x{}",
        config.capture.width, config.capture.height
    );
    println!();
    println!("Session:");
    println!("  Lock duration:            {} ms", config.session.lock_duration_ms);
    println!("  Failure threshold:        {}", config.session.failure_threshold);
    println!(
        "  Max generation attempts:  {}",
        config.session.max_generation_attempts
    );
    println!("  Idle timeout:             {} ms", config.session.idle_timeout_ms);
}
