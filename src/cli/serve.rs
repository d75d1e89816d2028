//! Web server command.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::cli::load_config;
use crate::web;

/// Serve the camera pages and the session API
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Host to bind to (overrides the config file)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Path to a config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self) -> Result<()> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        let addr = socket_addr(&config.server.host, config.server.port)?;
        info!(
            lock_duration_ms = config.session.lock_duration_ms,
            failure_threshold = config.session.failure_threshold,
            "Session rules"
        );

        web::run_server(config, addr).await
    }
}

fn socket_addr(host: &str, port: u16) -> Result<SocketAddr> {
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address: {host}:{port}"))
}
