//! Quote records and the errors raised while creating or importing them

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// A single quote. `text` is the identity key used for de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub text: String,
    pub category: String,
}

impl QuoteRecord {
    /// Builds a record from user input, trimming both fields.
    pub fn new(text: &str, category: &str) -> Result<Self, ValidationError> {
        let text = text.trim();
        let category = category.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        Ok(Self {
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    /// True when both fields carry non-whitespace content.
    pub fn is_well_formed(&self) -> bool {
        !self.text.trim().is_empty() && !self.category.trim().is_empty()
    }
}

impl Display for QuoteRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" ({})", self.text, self.category)
    }
}

/// The collection used when nothing has been persisted yet.
pub fn seed_quotes() -> Vec<QuoteRecord> {
    [
        (
            "The only way to do great work is to love what you do.",
            "Motivation",
        ),
        (
            "Success is not the key to happiness. Happiness is the key to success.",
            "Success",
        ),
        (
            "Education is the most powerful weapon which you can use to change the world.",
            "Education",
        ),
    ]
    .into_iter()
    .map(|(text, category)| QuoteRecord {
        text: text.to_string(),
        category: category.to_string(),
    })
    .collect()
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Quote text must not be empty")]
    EmptyText,
    #[error("Quote category must not be empty")]
    EmptyCategory,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Payload parsed, but the top level is not a sequence of records.
    #[error("Invalid JSON format: expected an array of quotes")]
    NotAnArray,
    /// Payload is not well-formed JSON.
    #[error("Error reading JSON: {0}")]
    ParseFailure(String),
}

/// Counts reported after a successful import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped_invalid: usize,
    pub skipped_duplicate: usize,
}

/// Category selection used when displaying quotes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    pub fn matches(&self, quote: &QuoteRecord) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(category) => quote.category == *category,
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::Category(category) => write!(f, "{category}"),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(ValidationError::EmptyCategory),
            "all" => Ok(CategoryFilter::All),
            category => Ok(CategoryFilter::Category(category.to_string())),
        }
    }
}
