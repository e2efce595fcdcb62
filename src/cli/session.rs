//! Interactive session: reads commands from stdin while the background sync
//! keeps running.

use super::{quotes, transfer, ui};
use crate::core::sync::{self, SharedStore};
use crate::core::RemoteSource;
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  show [category]          display a random quote (\"all\" for every category)
  list [category]          list quotes
  categories               list categories
  add <text> | <category>  add a quote
  import <path>            import quotes from a JSON file
  export [path]            export quotes to a JSON file (default quotes.json)
  sync                     sync with the server now
  last                     show the last displayed quote
  help                     show this help
  quit                     leave the session";

#[derive(Debug, PartialEq, Eq)]
enum SessionCommand {
    Empty,
    Help,
    Show(Option<String>),
    List(Option<String>),
    Categories,
    Add { text: String, category: String },
    Import(PathBuf),
    Export(PathBuf),
    Sync,
    Last,
    Quit,
}

fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    match name {
        "" => Ok(SessionCommand::Empty),
        "help" | "?" => Ok(SessionCommand::Help),
        "show" => Ok(SessionCommand::Show(argument)),
        "list" => Ok(SessionCommand::List(argument)),
        "categories" => Ok(SessionCommand::Categories),
        "add" => match rest.rsplit_once('|') {
            Some((text, category)) => Ok(SessionCommand::Add {
                text: text.to_string(),
                category: category.to_string(),
            }),
            None => Err("Usage: add <text> | <category>".to_string()),
        },
        "import" => argument
            .map(|path| SessionCommand::Import(PathBuf::from(path)))
            .ok_or_else(|| "Usage: import <path>".to_string()),
        "export" => Ok(SessionCommand::Export(PathBuf::from(
            argument.as_deref().unwrap_or(transfer::DEFAULT_EXPORT_FILE),
        ))),
        "sync" => Ok(SessionCommand::Sync),
        "last" => Ok(SessionCommand::Last),
        "quit" | "exit" => Ok(SessionCommand::Quit),
        other => Err(format!("Unknown command: {other}. Type 'help' for a list.")),
    }
}

async fn execute(
    store: &SharedStore,
    source: &dyn RemoteSource,
    command: SessionCommand,
) -> Result<()> {
    match command {
        SessionCommand::Empty | SessionCommand::Quit => {}
        SessionCommand::Help => println!("{HELP}"),
        SessionCommand::Show(category) => {
            quotes::show(&*store.lock().await, category.as_deref()).await?
        }
        SessionCommand::List(category) => {
            quotes::list(&*store.lock().await, category.as_deref()).await?
        }
        SessionCommand::Categories => quotes::categories(&*store.lock().await).await?,
        SessionCommand::Add { text, category } => {
            quotes::add(&mut *store.lock().await, &text, &category).await?
        }
        SessionCommand::Import(path) => transfer::import(&mut *store.lock().await, &path).await?,
        SessionCommand::Export(path) => transfer::export(&*store.lock().await, &path).await?,
        SessionCommand::Sync => super::sync::sync_now(store, source).await?,
        SessionCommand::Last => match store.lock().await.last_shown().await {
            Some(quote) => println!("{}", ui::format_quote(&quote)),
            None => println!("No quote displayed yet in this session."),
        },
    }
    Ok(())
}

fn prompt() {
    print!("> ");
    if let Err(e) = std::io::stdout().flush() {
        debug!("Failed to flush prompt: {}", e);
    }
}

pub async fn run(store: SharedStore, source: Arc<dyn RemoteSource>, interval: Duration) -> Result<()> {
    println!(
        "{}",
        ui::style_text("quotesync session", ui::StyleType::Title)
    );
    println!(
        "{}",
        ui::style_text("Type 'help' for commands.", ui::StyleType::Subtle)
    );
    quotes::show(&*store.lock().await, None).await?;

    let mut handle = sync::schedule(Arc::clone(&store), Arc::clone(&source), interval);
    let mut sync_running = true;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();

    loop {
        tokio::select! {
            outcome = handle.next_outcome(), if sync_running => match outcome {
                Some(outcome) => {
                    println!("\n{}", ui::sync_notification(&outcome));
                    prompt();
                }
                None => sync_running = false,
            },
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Session input closed");
                    break;
                };
                match parse_command(&line) {
                    Ok(SessionCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = execute(&store, source.as_ref(), command).await {
                            println!("{}", ui::style_text(&format!("{e:#}"), ui::StyleType::Error));
                        }
                    }
                    Err(message) => println!("{}", ui::style_text(&message, ui::StyleType::Error)),
                }
                prompt();
            }
        }
    }

    handle.stop().await;
    Ok(())
}
