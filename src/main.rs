use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod cli;
mod core;
mod daemon;

use crate::core::settings::Settings;

#[derive(Parser)]
#[command(name = "bsky-follow-back")]
#[command(author, version, about = "Bluesky bot that follows back new followers")]
struct Cli {
    /// Path to the config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and follow back new followers until interrupted
    Run,

    /// Run a single follow-back cycle and exit
    Check,

    /// Show the account's follower counts
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    init_logging();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run => daemon::run(settings).await,
        Commands::Check => cli::check::run(settings).await,
        Commands::Status { json } => cli::status::run(settings, json).await,
        Commands::Completions { .. } => Ok(()),
    }
}
