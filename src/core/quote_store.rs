//! The local quote collection and its reconciliation against a remote source

use super::quote::{
    CategoryFilter, ImportError, ImportSummary, QuoteRecord, ValidationError, seed_quotes,
};
use super::remote::RemoteSource;
use super::storage::KeyValueCollection;
use rand::seq::IndexedRandom;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const QUOTES_KEY: &[u8] = b"quotes";
pub const LAST_FILTER_KEY: &[u8] = b"lastFilter";
pub const LAST_QUOTE_KEY: &[u8] = b"lastQuote";

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Updated { added: usize },
    NoChange,
    Failed { reason: String },
}

impl Display for ReconcileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileOutcome::Updated { added } => {
                write!(f, "{added} new quote(s) synced from server.")
            }
            ReconcileOutcome::NoChange => write!(f, "Quotes are up to date."),
            ReconcileOutcome::Failed { reason } => {
                write!(f, "Error syncing with server: {reason}")
            }
        }
    }
}

/// Owns the quote collection and mirrors every change to durable storage.
///
/// `local` holds the collection and the last selected filter; `session`
/// holds the last displayed quote.
pub struct QuoteStore {
    quotes: Vec<QuoteRecord>,
    local: Arc<dyn KeyValueCollection>,
    session: Arc<dyn KeyValueCollection>,
    dedup_on_import: bool,
}

impl QuoteStore {
    /// Loads the persisted collection, falling back to the seed set when
    /// nothing usable is stored.
    pub async fn initialize(
        local: Arc<dyn KeyValueCollection>,
        session: Arc<dyn KeyValueCollection>,
    ) -> Self {
        let quotes = match local.get(QUOTES_KEY).await {
            Some(bytes) => match serde_json::from_slice::<Vec<QuoteRecord>>(&bytes) {
                Ok(quotes) => {
                    debug!("Loaded {} persisted quotes", quotes.len());
                    quotes
                }
                Err(e) => {
                    warn!("Persisted quotes are unreadable ({}). Using seed quotes", e);
                    seed_quotes()
                }
            },
            None => {
                debug!("No persisted quotes found. Using seed quotes");
                seed_quotes()
            }
        };

        Self {
            quotes,
            local,
            session,
            dedup_on_import: false,
        }
    }

    /// Makes `import_batch` skip records whose text is already present.
    pub fn with_import_dedup(mut self, dedup: bool) -> Self {
        self.dedup_on_import = dedup;
        self
    }

    pub fn quotes(&self) -> &[QuoteRecord] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.quotes.iter().any(|q| q.text == text)
    }

    pub async fn add(&mut self, text: &str, category: &str) -> Result<QuoteRecord, ValidationError> {
        let quote = QuoteRecord::new(text, category)?;
        self.quotes.push(quote.clone());
        self.persist().await;
        info!("Added quote in category {}", quote.category);
        Ok(quote)
    }

    /// Appends every well-formed record from a JSON array payload.
    ///
    /// Nothing is appended when the payload fails to parse or is not an
    /// array.
    pub async fn import_batch(&mut self, payload: &[u8]) -> Result<ImportSummary, ImportError> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|e| ImportError::ParseFailure(e.to_string()))?;
        let Value::Array(items) = value else {
            return Err(ImportError::NotAnArray);
        };

        let mut summary = ImportSummary::default();
        let mut seen: HashSet<String> = if self.dedup_on_import {
            self.quotes.iter().map(|q| q.text.clone()).collect()
        } else {
            HashSet::new()
        };

        for item in items {
            let quote = match serde_json::from_value::<QuoteRecord>(item) {
                Ok(quote) if quote.is_well_formed() => quote,
                Ok(_) | Err(_) => {
                    summary.skipped_invalid += 1;
                    continue;
                }
            };
            if self.dedup_on_import && !seen.insert(quote.text.clone()) {
                summary.skipped_duplicate += 1;
                continue;
            }
            self.quotes.push(quote);
            summary.added += 1;
        }

        if summary.added > 0 {
            self.persist().await;
        }
        info!(
            added = summary.added,
            skipped_invalid = summary.skipped_invalid,
            skipped_duplicate = summary.skipped_duplicate,
            "Imported quotes"
        );
        Ok(summary)
    }

    /// The collection in the interchange format, pretty printed.
    pub fn export_snapshot(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.quotes)
    }

    /// Fetches from `source` and merges the result. The fetch happens while
    /// `self` is borrowed; use [`crate::core::sync::sync_once`] to fetch
    /// without holding a shared store's lock.
    pub async fn reconcile(&mut self, source: &dyn RemoteSource) -> ReconcileOutcome {
        match source.fetch_quotes().await {
            Ok(remote) => self.merge_remote(remote).await,
            Err(e) => {
                warn!("Sync error: {}", e);
                ReconcileOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Appends remote records whose text is not present locally. Local
    /// records are never replaced, and records with a blank field are
    /// dropped.
    pub async fn merge_remote(&mut self, remote: Vec<QuoteRecord>) -> ReconcileOutcome {
        let mut known: HashSet<String> = self.quotes.iter().map(|q| q.text.clone()).collect();
        let mut added = 0;
        for quote in remote {
            if !quote.is_well_formed() {
                debug!("Dropping blank remote quote: {:?}", quote);
                continue;
            }
            if known.insert(quote.text.clone()) {
                self.quotes.push(quote);
                added += 1;
            }
        }

        if added == 0 {
            debug!("Sync found no new quotes");
            return ReconcileOutcome::NoChange;
        }
        self.persist().await;
        info!("{} new quote(s) synced from server", added);
        ReconcileOutcome::Updated { added }
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.quotes
            .iter()
            .filter(|q| seen.insert(q.category.as_str()))
            .map(|q| q.category.clone())
            .collect()
    }

    pub fn filtered(&self, filter: &CategoryFilter) -> Vec<&QuoteRecord> {
        self.quotes.iter().filter(|q| filter.matches(q)).collect()
    }

    /// Picks a random quote matching `filter` and remembers it in session
    /// storage.
    pub async fn pick_random(&self, filter: &CategoryFilter) -> Option<QuoteRecord> {
        let candidates = self.filtered(filter);
        let quote = (*candidates.choose(&mut rand::rng())?).clone();

        match serde_json::to_vec(&quote) {
            Ok(bytes) => self.session.put(LAST_QUOTE_KEY, &bytes).await,
            Err(e) => warn!("Failed to serialize last quote: {}", e),
        }
        Some(quote)
    }

    /// The quote most recently returned by `pick_random` in this session.
    pub async fn last_shown(&self) -> Option<QuoteRecord> {
        let bytes = self.session.get(LAST_QUOTE_KEY).await?;
        serde_json::from_slice(&bytes).ok()
    }

    pub async fn set_last_filter(&self, filter: &CategoryFilter) {
        self.local
            .put(LAST_FILTER_KEY, filter.to_string().as_bytes())
            .await;
    }

    /// The saved filter, provided it still names a known category.
    pub async fn last_filter(&self) -> CategoryFilter {
        let Some(bytes) = self.local.get(LAST_FILTER_KEY).await else {
            return CategoryFilter::All;
        };
        let saved = String::from_utf8_lossy(&bytes);
        match saved.parse::<CategoryFilter>() {
            Ok(CategoryFilter::All) => CategoryFilter::All,
            Ok(CategoryFilter::Category(category)) if self.categories().contains(&category) => {
                CategoryFilter::Category(category)
            }
            _ => {
                debug!("Ignoring saved filter: {}", saved);
                CategoryFilter::All
            }
        }
    }

    async fn persist(&self) {
        match serde_json::to_vec(&self.quotes) {
            Ok(bytes) => self.local.put(QUOTES_KEY, &bytes).await,
            Err(e) => warn!("Failed to serialize quotes: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::remote::NetworkError;
    use crate::store::memory::MemoryCollection;
    use async_trait::async_trait;

    struct StaticSource(Result<Vec<QuoteRecord>, NetworkError>);

    #[async_trait]
    impl RemoteSource for StaticSource {
        async fn fetch_quotes(&self) -> Result<Vec<QuoteRecord>, NetworkError> {
            self.0.clone()
        }
    }

    fn quote(text: &str, category: &str) -> QuoteRecord {
        QuoteRecord {
            text: text.to_string(),
            category: category.to_string(),
        }
    }

    fn collections() -> (Arc<dyn KeyValueCollection>, Arc<dyn KeyValueCollection>) {
        (
            Arc::new(MemoryCollection::new()),
            Arc::new(MemoryCollection::new()),
        )
    }

    async fn store_with(quotes: &[QuoteRecord]) -> QuoteStore {
        let (local, session) = collections();
        local
            .put(QUOTES_KEY, &serde_json::to_vec(quotes).unwrap())
            .await;
        QuoteStore::initialize(local, session).await
    }

    async fn persisted(local: &Arc<dyn KeyValueCollection>) -> Vec<QuoteRecord> {
        serde_json::from_slice(&local.get(QUOTES_KEY).await.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_without_storage_uses_seed() {
        let (local, session) = collections();
        let store = QuoteStore::initialize(local.clone(), session).await;

        assert_eq!(store.quotes(), seed_quotes().as_slice());
        // Loading alone does not write anything back
        assert!(local.get(QUOTES_KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_initialize_with_truncated_storage_uses_seed() {
        let (local, session) = collections();
        local.put(QUOTES_KEY, br#"[{"text": "Half a quo"#).await;

        let store = QuoteStore::initialize(local, session).await;
        assert_eq!(store.quotes(), seed_quotes().as_slice());
    }

    #[tokio::test]
    async fn test_initialize_with_wrong_shape_uses_seed() {
        let (local, session) = collections();
        local.put(QUOTES_KEY, br#"{"text": "x", "category": "y"}"#).await;

        let store = QuoteStore::initialize(local, session).await;
        assert_eq!(store.len(), seed_quotes().len());
    }

    #[tokio::test]
    async fn test_initialize_loads_persisted_quotes() {
        let store = store_with(&[quote("Stay hungry.", "Life")]).await;
        assert_eq!(store.quotes(), &[quote("Stay hungry.", "Life")]);
    }

    #[tokio::test]
    async fn test_initialize_keeps_persisted_empty_collection() {
        let store = store_with(&[]).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_add_validates_and_persists() {
        let (local, session) = collections();
        let mut store = QuoteStore::initialize(local.clone(), session).await;

        assert_eq!(store.add("", "X").await, Err(ValidationError::EmptyText));
        assert_eq!(
            store.add("X", "").await,
            Err(ValidationError::EmptyCategory)
        );
        assert_eq!(store.add("", "").await, Err(ValidationError::EmptyText));
        assert_eq!(store.len(), 3);
        assert!(local.get(QUOTES_KEY).await.is_none());

        let added = store.add("  hi  ", "  Cat  ").await.unwrap();
        assert_eq!(added, quote("hi", "Cat"));
        assert_eq!(store.quotes().last(), Some(&quote("hi", "Cat")));
        assert_eq!(persisted(&local).await, store.quotes());
    }

    #[tokio::test]
    async fn test_reload_sees_previous_mutations() {
        let (local, session) = collections();
        let mut store = QuoteStore::initialize(local.clone(), session.clone()).await;
        store.add("Keep going.", "Motivation").await.unwrap();
        drop(store);

        let reloaded = QuoteStore::initialize(local, session).await;
        assert_eq!(reloaded.len(), 4);
        assert!(reloaded.contains_text("Keep going."));
    }

    #[tokio::test]
    async fn test_import_rejects_object() {
        let (local, session) = collections();
        let mut store = QuoteStore::initialize(local.clone(), session).await;

        let result = store
            .import_batch(br#"{"text": "x", "category": "y"}"#)
            .await;
        assert_eq!(result, Err(ImportError::NotAnArray));
        assert_eq!(store.quotes(), seed_quotes().as_slice());
        assert!(local.get(QUOTES_KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_json() {
        let mut store = store_with(&[]).await;

        let result = store.import_batch(b"[{\"text\": ").await;
        assert!(matches!(result, Err(ImportError::ParseFailure(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_import_appends_without_dedup() {
        let (local, session) = collections();
        let mut store = QuoteStore::initialize(local.clone(), session).await;
        let existing = seed_quotes()[0].clone();

        let payload = serde_json::to_vec(&vec![existing.clone(), quote("New", "Misc")]).unwrap();
        let summary = store.import_batch(&payload).await.unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                added: 2,
                skipped_invalid: 0,
                skipped_duplicate: 0
            }
        );
        assert_eq!(store.len(), 5);
        assert_eq!(
            store.quotes().iter().filter(|q| q.text == existing.text).count(),
            2
        );
        assert_eq!(persisted(&local).await, store.quotes());
    }

    #[tokio::test]
    async fn test_import_with_dedup_skips_known_text() {
        let (local, session) = collections();
        let mut store = QuoteStore::initialize(local, session)
            .await
            .with_import_dedup(true);
        let existing = seed_quotes()[1].clone();

        let payload = serde_json::to_vec(&vec![
            existing,
            quote("New", "Misc"),
            quote("New", "Other"),
        ])
        .unwrap();
        let summary = store.import_batch(&payload).await.unwrap();

        assert_eq!(summary.added, 1);
        assert_eq!(summary.skipped_duplicate, 2);
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_import_skips_badly_shaped_records() {
        let mut store = store_with(&[]).await;

        let payload = br#"[
            {"text": "Good", "category": "Fine"},
            {"text": "No category"},
            {"text": "", "category": "Empty"},
            42
        ]"#;
        let summary = store.import_batch(payload).await.unwrap();

        assert_eq!(summary.added, 1);
        assert_eq!(summary.skipped_invalid, 3);
        assert_eq!(store.quotes(), &[quote("Good", "Fine")]);
    }

    #[tokio::test]
    async fn test_export_then_import_round_trip() {
        let original = store_with(&[quote("A", "One"), quote("B", "Two"), quote("A", "One")]).await;
        let snapshot = original.export_snapshot().unwrap();

        let text = String::from_utf8(snapshot.clone()).unwrap();
        assert!(text.starts_with("[\n  {\n    \"text\": \"A\""));

        let mut target = store_with(&[]).await;
        target.import_batch(&snapshot).await.unwrap();
        assert_eq!(target.quotes(), original.quotes());
    }

    #[tokio::test]
    async fn test_reconcile_end_to_end() {
        let local_quote = quote("The only limit is your mind.", "Motivation");
        let (local, session) = collections();
        local
            .put(QUOTES_KEY, &serde_json::to_vec(&[local_quote.clone()]).unwrap())
            .await;
        let mut store = QuoteStore::initialize(local.clone(), session).await;

        let source = StaticSource(Ok(vec![
            quote("The only limit is your mind.", "Server"),
            quote("New one.", "Server"),
        ]));
        let outcome = store.reconcile(&source).await;

        assert_eq!(outcome, ReconcileOutcome::Updated { added: 1 });
        assert_eq!(
            store.quotes(),
            &[local_quote, quote("New one.", "Server")]
        );
        assert_eq!(persisted(&local).await, store.quotes());
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let mut store = store_with(&[quote("A", "Local")]).await;
        let source = StaticSource(Ok(vec![quote("B", "Server"), quote("A", "Server")]));

        assert_eq!(
            store.reconcile(&source).await,
            ReconcileOutcome::Updated { added: 1 }
        );
        let after_first = store.quotes().to_vec();

        assert_eq!(store.reconcile(&source).await, ReconcileOutcome::NoChange);
        assert_eq!(store.quotes(), after_first.as_slice());
    }

    #[tokio::test]
    async fn test_reconcile_keeps_text_unique() {
        let mut store = store_with(&[quote("A", "Local"), quote("B", "Local")]).await;
        let remote = vec![
            quote("C", "Server"),
            quote("A", "Server"),
            quote("C", "Other"),
            quote("D", "Server"),
        ];

        let outcome = store.merge_remote(remote.clone()).await;
        assert_eq!(outcome, ReconcileOutcome::Updated { added: 2 });

        for text in ["A", "B", "C", "D"] {
            assert_eq!(store.quotes().iter().filter(|q| q.text == text).count(), 1);
        }
        // First remote occurrence wins
        assert!(store.quotes().contains(&quote("C", "Server")));
        assert!(store.quotes().contains(&quote("A", "Local")));
    }

    #[tokio::test]
    async fn test_merge_drops_blank_remote_records() {
        let (local, session) = collections();
        let mut store = QuoteStore::initialize(local.clone(), session).await;

        let outcome = store
            .merge_remote(vec![quote("", ""), quote("Text only", "  "), quote("  ", "Cat")])
            .await;
        assert_eq!(outcome, ReconcileOutcome::NoChange);
        assert_eq!(store.quotes(), seed_quotes().as_slice());
        assert!(local.get(QUOTES_KEY).await.is_none());

        let outcome = store
            .merge_remote(vec![quote("", "Server"), quote("Kept.", "Server")])
            .await;
        assert_eq!(outcome, ReconcileOutcome::Updated { added: 1 });
        assert!(store.quotes().iter().all(QuoteRecord::is_well_formed));
    }

    #[tokio::test]
    async fn test_import_accepts_extra_fields() {
        let mut store = store_with(&[]).await;

        let payload = br#"[{"text": "a", "category": "b", "extra": 1}]"#;
        let summary = store.import_batch(payload).await.unwrap();

        assert_eq!(summary.added, 1);
        assert_eq!(store.quotes(), &[quote("a", "b")]);
    }

    #[tokio::test]
    async fn test_reconcile_failure_leaves_store_untouched() {
        let (local, session) = collections();
        let mut store = QuoteStore::initialize(local.clone(), session).await;
        let source = StaticSource(Err(NetworkError::Status(500)));

        let outcome = store.reconcile(&source).await;
        assert_eq!(
            outcome,
            ReconcileOutcome::Failed {
                reason: "Server responded with status 500".to_string()
            }
        );
        assert_eq!(store.quotes(), seed_quotes().as_slice());
        assert!(local.get(QUOTES_KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_categories_in_first_seen_order() {
        let store = store_with(&[
            quote("A", "Life"),
            quote("B", "Work"),
            quote("C", "Life"),
        ])
        .await;
        assert_eq!(store.categories(), vec!["Life", "Work"]);
    }

    #[tokio::test]
    async fn test_pick_random_respects_filter_and_records_session() {
        let store = store_with(&[quote("A", "Life"), quote("B", "Work")]).await;
        assert!(store.last_shown().await.is_none());

        let filter = CategoryFilter::Category("Work".to_string());
        for _ in 0..10 {
            assert_eq!(store.pick_random(&filter).await, Some(quote("B", "Work")));
        }
        assert_eq!(store.last_shown().await, Some(quote("B", "Work")));

        let missing = CategoryFilter::Category("Nope".to_string());
        assert!(store.pick_random(&missing).await.is_none());

        let any = store.pick_random(&CategoryFilter::All).await.unwrap();
        assert!(store.quotes().contains(&any));
    }

    #[tokio::test]
    async fn test_last_filter_round_trip() {
        let store = store_with(&[quote("A", "Life")]).await;
        assert_eq!(store.last_filter().await, CategoryFilter::All);

        let life = CategoryFilter::Category("Life".to_string());
        store.set_last_filter(&life).await;
        assert_eq!(store.last_filter().await, life);

        store.set_last_filter(&CategoryFilter::All).await;
        assert_eq!(store.last_filter().await, CategoryFilter::All);
    }

    #[tokio::test]
    async fn test_last_filter_ignores_unknown_category() {
        let store = store_with(&[quote("A", "Life")]).await;
        store
            .set_last_filter(&CategoryFilter::Category("Gone".to_string()))
            .await;
        assert_eq!(store.last_filter().await, CategoryFilter::All);
    }
}
