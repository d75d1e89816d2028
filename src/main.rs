//! FingerMath - arithmetic practice by counting fingers
//!
//! Serves the camera exercise pages and their session API, or replays
//! recorded detections through a session from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fingermath::cli::{ConfigArgs, ReplayArgs};
#[cfg(feature = "web")]
use fingermath::cli::ServeArgs;

/// FingerMath - solve arithmetic problems by showing the answer with your fingers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the web server
    #[cfg(feature = "web")]
    Serve(ServeArgs),
    /// Replay recorded detections through a session
    Replay(ReplayArgs),
    /// Manage the configuration file
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays clean
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        #[cfg(feature = "web")]
        Command::Serve(args) => args.execute().await,
        Command::Replay(args) => args.execute().await,
        Command::Config(args) => args.execute(),
    }
}
