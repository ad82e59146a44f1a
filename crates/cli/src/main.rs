//! Chatline CLI, the main entry point.
//!
//! Commands:
//! - `demo`    Run the scripted create / prompt / switch / prompt session
//! - `chat`    Interactive chat through the command pipeline
//! - `config`  Show the effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "chatline",
    about = "Chatline: conversational agents behind a composable command pipeline",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scripted demo session
    Demo {
        /// Use the offline echo provider instead of the configured backend
        #[arg(long)]
        offline: bool,

        /// Switch to the expert strategy instead of advanced
        #[arg(long)]
        expert: bool,
    },

    /// Chat interactively
    Chat {
        /// Use the offline echo provider instead of the configured backend
        #[arg(long)]
        offline: bool,

        /// Give the session user a subscription lasting this many days
        #[arg(long, value_name = "N")]
        subscribed_days: Option<i64>,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Demo { offline, expert } => commands::demo::run(offline, expert, cli.verbose).await?,
        Commands::Chat {
            offline,
            subscribed_days,
        } => commands::chat::run(offline, subscribed_days, cli.verbose).await?,
        Commands::Config => commands::config_cmd::show().await?,
    }

    Ok(())
}
