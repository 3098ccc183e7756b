use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use riverwatch_core::AppConfig;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "riverwatch")]
#[command(author, version, about = "Posts a digest of important unread news to a chat channel")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the configuration file (default: ~/.config/riverwatch/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run now, then on every interval until Ctrl+C
    Run,
    /// Run the pipeline a single time and exit
    Once,
    /// Fetch, classify and summarize, then print the digest instead of posting it
    Preview,
    /// Show the effective configuration and any missing credentials
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    if let Some(Commands::CheckConfig) = cli.command {
        return commands::check_config::run(&config, cli.config.as_deref());
    }

    // Keep the guard alive so buffered file logs are flushed on exit
    let _guard = logging::init(&config)?;

    if let Some(ref path) = cli.config {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
        }
    }

    // Missing credentials are reported but never stop the process
    for warning in config.validate() {
        error!("{}", warning);
    }
    info!(
        feed_user = config.feed.username.is_some(),
        ai_key = config.ai.api_key.is_some(),
        chat_token = config.chat.bot_token.is_some(),
        chat_id = config.chat.chat_id.is_some(),
        "Credentials present"
    );

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(&config).await,
        Some(Commands::Once) => commands::once::run(&config).await,
        Some(Commands::Preview) => commands::preview::run(&config).await,
        Some(Commands::CheckConfig) => Ok(()),
    }
}
