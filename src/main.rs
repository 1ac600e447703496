mod commands;
mod google;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use next_meeting_core::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "next-meeting")]
#[command(about = "Show your current and next meeting on one line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current and next meeting (default)
    Status {
        /// Ignore the cached snapshot and fetch fresh events
        #[arg(long)]
        no_cache: bool,

        /// Include meetings you declined or haven't answered
        #[arg(long)]
        all: bool,
    },
    /// Print a notification for the next meeting if it's about to start
    Notify {
        /// Minutes before the start to notify (overrides config)
        #[arg(short, long)]
        threshold: Option<i64>,

        /// Include meetings you declined or haven't answered
        #[arg(long)]
        all: bool,
    },
    /// Delete the cached snapshot
    ClearCache,
    /// Forget which meetings were already notified
    ClearNotifications,
    /// Show the config file location and resolved settings
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays a single status line
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        None => commands::status::run(&config, false, false).await,
        Some(Commands::Status { no_cache, all }) => {
            commands::status::run(&config, no_cache, all).await
        }
        Some(Commands::Notify { threshold, all }) => {
            commands::notify::run(&config, threshold, all).await
        }
        Some(Commands::ClearCache) => commands::clear::cache(&config),
        Some(Commands::ClearNotifications) => commands::clear::notifications(&config),
        Some(Commands::Config) => commands::config::run(&config),
    }
}
