mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mood_journal::config::MoodJournalConfig;
use mood_journal::server;

#[derive(Parser)]
#[command(name = "mood-journal", version, about = "Journal with LLM mood analysis and Q&A")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API server
    Serve,
    /// Write a new entry and analyse it
    Write {
        /// Entry text
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Analyse text without storing it
    Analyze {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Ask questions about past entries through a running server
    Ask {
        /// Base URL of the server (defaults to the configured bind address)
        #[arg(long)]
        url: Option<String>,
    },
    /// List entries with their moods
    List,
    /// Show sentiment over time
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = MoodJournalConfig::load()?;

    // Log to stderr so command output on stdout stays clean.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => server::serve(config).await?,
        Command::Write { text } => cli::entries::write(&config, &text.join(" ")).await?,
        Command::Analyze { text } => cli::entries::analyze(&config, &text.join(" ")).await?,
        Command::Ask { url } => {
            let url = url.unwrap_or_else(|| format!("http://{}", config.bind_addr()));
            cli::ask::ask(&url).await?;
        }
        Command::List => cli::entries::list(&config)?,
        Command::History => cli::entries::history(&config)?,
    }

    Ok(())
}
