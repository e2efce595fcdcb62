//! Quote collection, storage and sync abstractions

pub mod config;
pub mod log;
pub mod quote;
pub mod quote_store;
pub mod remote;
pub mod storage;
pub mod sync;

// Re-export main types for cleaner imports
pub use quote::{CategoryFilter, ImportError, ImportSummary, QuoteRecord, ValidationError};
pub use quote_store::{QuoteStore, ReconcileOutcome};
pub use remote::{NetworkError, RemoteSource};
pub use sync::{SharedStore, SyncHandle};
