//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use lochat_core::config::Config;

mod commands;
mod interrupt;
mod render;

#[derive(Parser)]
#[command(name = "lochat")]
#[command(version)]
#[command(about = "Terminal chat for local Ollama models")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the model from config
    #[arg(short, long, global = true)]
    model: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Interactive chat (default when no command is given)
    Chat,
    /// Send a single prompt and print the streamed response
    Ask {
        /// The prompt to send
        #[arg(value_name = "PROMPT")]
        prompt: String,
    },
    /// Download a model, streaming progress
    Pull {
        /// Model name, e.g. "llama3.2" or "qwen2.5:7b"
        #[arg(value_name = "MODEL")]
        name: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    interrupt::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(dispatch(cli))
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("load config")?;
    if let Some(model) = cli.model {
        config.model = model;
    }

    match cli.command {
        None | Some(Commands::Chat) => commands::chat::run(&config).await,
        Some(Commands::Ask { prompt }) => commands::ask::run(&prompt, &config).await,
        Some(Commands::Pull { name }) => commands::pull::run(&name, &config).await,
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
