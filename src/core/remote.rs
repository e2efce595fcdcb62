//! Remote quote source abstractions

use super::quote::QuoteRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Server responded with status {0}")]
    Status(u16),
    #[error("Failed to decode server response: {0}")]
    Decode(String),
}

/// Something that can hand back the server's view of the quote collection.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_quotes(&self) -> Result<Vec<QuoteRecord>, NetworkError>;
}
