mod chat_client;
mod cli;
mod config;

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use eyre::Result;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use crate::cli::chat::ChatContext;
use crate::config::{ChatConfig, Overrides};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    chat: ChatArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session
    Chat,
}

/// Session options. They are global so they can go before or after the
/// `chat` subcommand.
#[derive(Args)]
struct ChatArgs {
    /// Send a single message, print the reply and exit
    #[arg(short, long, global = true)]
    input: Option<String>,

    /// Base URL of the chat service [env: CHAT_API_URL]
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds [env: CHAT_TIMEOUT_SECS]
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    /// Title shown in the banner and prompt [env: CHAT_TITLE]
    #[arg(long, global = true)]
    title: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    // Chat is the only mode; the subcommand is accepted for clarity
    let args = match cli.command {
        Some(Commands::Chat) | None => cli.chat,
    };

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };

    // Logs go to stderr so they stay out of the transcript
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Starting chat client");

    let config = match ChatConfig::resolve(Overrides {
        endpoint: args.endpoint,
        timeout_secs: args.timeout,
        title: args.title,
    }) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let terminal = io::stdout().is_terminal();
    let mut chat_context = ChatContext::new(Box::new(io::stdout()), args.input, config, terminal);
    chat_context.run().await
}
