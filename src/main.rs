use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use quotesync::cli::transfer::DEFAULT_EXPORT_FILE;
use quotesync::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for quotesync::AppCommand {
    fn from(cmd: Commands) -> quotesync::AppCommand {
        match cmd {
            Commands::Show { category } => quotesync::AppCommand::Show { category },
            Commands::List { category } => quotesync::AppCommand::List { category },
            Commands::Categories => quotesync::AppCommand::Categories,
            Commands::Add { text, category } => quotesync::AppCommand::Add { text, category },
            Commands::Import { path } => quotesync::AppCommand::Import { path },
            Commands::Export { output } => quotesync::AppCommand::Export { output },
            Commands::Sync => quotesync::AppCommand::Sync,
            Commands::Watch => quotesync::AppCommand::Watch,
            Commands::Session => quotesync::AppCommand::Session,
            Commands::Reset => quotesync::AppCommand::Reset,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display a random quote
    Show {
        /// Category to pick from ("all" for every category); remembered for next time
        #[arg(short = 'g', long)]
        category: Option<String>,
    },
    /// List stored quotes
    List {
        /// Only list quotes in this category
        #[arg(short = 'g', long)]
        category: Option<String>,
    },
    /// List categories
    Categories,
    /// Add a quote
    Add {
        /// Quote text
        text: String,
        /// Quote category
        category: String,
    },
    /// Import quotes from a JSON file
    Import {
        /// File containing a JSON array of quotes
        path: PathBuf,
    },
    /// Export quotes to a JSON file
    Export {
        /// Destination file
        #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
        output: PathBuf,
    },
    /// Sync with the server once
    Sync,
    /// Keep syncing with the server on the configured interval
    Watch,
    /// Start an interactive session with background sync
    Session,
    /// Clear stored quotes and the remembered filter
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => quotesync::cli::setup::setup(),
        Some(cmd) => quotesync::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
