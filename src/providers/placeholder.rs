use crate::core::{NetworkError, QuoteRecord, RemoteSource};
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

/// Characters of a post body used as the quote category.
const CATEGORY_PREFIX_LEN: usize = 15;
const FALLBACK_CATEGORY: &str = "Server";

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    body: String,
}

impl Post {
    /// Title and category prefix are trimmed, so a padded title dedups
    /// against the same text typed locally and a whitespace-only prefix
    /// falls back to `Server`.
    fn into_quote(self) -> Option<QuoteRecord> {
        let text = self.title.trim();
        if text.is_empty() {
            return None;
        }
        let prefix: String = self.body.chars().take(CATEGORY_PREFIX_LEN).collect();
        let category = match prefix.trim() {
            "" => FALLBACK_CATEGORY,
            trimmed => trimmed,
        };
        Some(QuoteRecord {
            text: text.to_string(),
            category: category.to_string(),
        })
    }
}

/// Reads "quotes" from a JSONPlaceholder-style `/posts` endpoint.
pub struct PlaceholderProvider {
    base_url: String,
    limit: usize,
    client: reqwest::Client,
}

impl PlaceholderProvider {
    pub fn new(base_url: &str, limit: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("quotesync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
            client,
        })
    }
}

#[async_trait]
impl RemoteSource for PlaceholderProvider {
    async fn fetch_quotes(&self) -> Result<Vec<QuoteRecord>, NetworkError> {
        let url = format!("{}/posts", self.base_url);
        debug!("Requesting quotes from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| NetworkError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status(status.as_u16()));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| NetworkError::Request(e.to_string()))?;

        let posts: Vec<Post> = serde_json::from_str(&response_text).map_err(|e| {
            error!(
                error = ?e,
                response = %response_text,
                "Failed to parse posts response"
            );
            NetworkError::Decode(e.to_string())
        })?;

        let quotes: Vec<QuoteRecord> = posts
            .into_iter()
            .take(self.limit)
            .filter_map(Post::into_quote)
            .collect();
        debug!("Mapped {} posts to quotes", quotes.len());
        Ok(quotes)
    }
}
