// Skillable - job coach assistant
// Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use skillable::cli::Repl;
use skillable::config::load_config;
use skillable::logging::{init_tracing, SummaryOutbox};
use skillable::providers::AzureOpenAIProvider;
use skillable::session::ChatSession;
use skillable::upload::AzureBlobStore;

#[derive(Parser)]
#[command(name = "skillable", version, about = "Job coach assistant")]
struct Cli {
    /// Config file (default: ~/.skillable/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Ask one question and print the answer
    Ask {
        query: String,
        /// Documents to upload before asking
        #[arg(long = "upload")]
        uploads: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    let provider = AzureOpenAIProvider::new(&config.completion)?;
    let store = config.storage.as_ref().map(AzureBlobStore::new).transpose()?;
    let outbox = SummaryOutbox::new(config.outbox_path.clone())?;

    let session = ChatSession::new().with_known_documents(config.known_documents.clone());
    let mut repl = Repl::new(session, Box::new(provider), store, outbox);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => repl.run().await?,
        Commands::Ask { query, uploads } => repl.run_once(&query, &uploads).await?,
    }

    Ok(())
}
