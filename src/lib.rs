pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::storage::{KeyValueCollection, Store};
use crate::core::{QuoteStore, RemoteSource};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use store::KeyValueStore;
use store::memory::MemoryCollection;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Durable collection holding the quotes and the last filter.
pub const LOCAL_COLLECTION: &str = "local";
/// Ephemeral collection holding the last displayed quote.
pub const SESSION_COLLECTION: &str = "session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Show { category: Option<String> },
    List { category: Option<String> },
    Categories,
    Add { text: String, category: String },
    Import { path: PathBuf },
    Export { output: PathBuf },
    Sync,
    Watch,
    Session,
    Reset,
}

/// Opens the quote store on top of `kv`. Falls back to memory when the
/// durable collection is unavailable, so the app keeps working.
pub async fn open_quote_store(kv: &dyn Store, config: &AppConfig) -> QuoteStore {
    let local = kv
        .get_collection(LOCAL_COLLECTION, true, true)
        .unwrap_or_else(|| {
            warn!("Durable storage unavailable, changes will not be kept");
            Arc::new(MemoryCollection::new()) as Arc<dyn KeyValueCollection>
        });
    let session = kv
        .get_collection(SESSION_COLLECTION, false, true)
        .unwrap_or_else(|| Arc::new(MemoryCollection::new()) as Arc<dyn KeyValueCollection>);

    QuoteStore::initialize(local, session)
        .await
        .with_import_dedup(config.import.dedup)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("quotesync starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_path = config.data_path()?;
    let kv = KeyValueStore::open(&data_path);
    let mut quote_store = open_quote_store(&kv, &config).await;

    match command {
        AppCommand::Show { category } => cli::quotes::show(&quote_store, category.as_deref()).await,
        AppCommand::List { category } => cli::quotes::list(&quote_store, category.as_deref()).await,
        AppCommand::Categories => cli::quotes::categories(&quote_store).await,
        AppCommand::Add { text, category } => {
            cli::quotes::add(&mut quote_store, &text, &category).await
        }
        AppCommand::Import { path } => cli::transfer::import(&mut quote_store, &path).await,
        AppCommand::Export { output } => cli::transfer::export(&quote_store, &output).await,
        AppCommand::Reset => match kv.get_collection(LOCAL_COLLECTION, true, false) {
            Some(local) => cli::quotes::reset(local.as_ref()).await,
            None => anyhow::bail!("Durable storage unavailable at {}", data_path.display()),
        },
        AppCommand::Sync | AppCommand::Watch | AppCommand::Session => {
            let source: Arc<dyn RemoteSource> = Arc::new(
                providers::placeholder::PlaceholderProvider::new(
                    &config.sync.base_url,
                    config.sync.limit,
                )?,
            );
            let shared = Arc::new(Mutex::new(quote_store));
            let interval = config.sync.interval();

            match command {
                AppCommand::Sync => cli::sync::sync_now(&shared, source.as_ref()).await,
                AppCommand::Watch => cli::sync::watch(shared, source, interval).await,
                _ => cli::session::run(shared, source, interval).await,
            }
        }
    }
}
