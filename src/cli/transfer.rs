use super::ui;
use crate::core::QuoteStore;
use anyhow::{Context, Result};
use std::path::Path;

pub const DEFAULT_EXPORT_FILE: &str = "quotes.json";

/// Reads a JSON file of quotes and appends them to the collection.
pub async fn import(store: &mut QuoteStore, path: &Path) -> Result<()> {
    let payload = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;

    let summary = store
        .import_batch(&payload)
        .await
        .with_context(|| format!("Failed to import {}", path.display()))?;

    println!(
        "{}",
        ui::style_text(
            &format!("{} quote(s) imported successfully!", summary.added),
            ui::StyleType::Success
        )
    );
    if summary.skipped_invalid > 0 || summary.skipped_duplicate > 0 {
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "Skipped {} malformed and {} duplicate entries.",
                    summary.skipped_invalid, summary.skipped_duplicate
                ),
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}

/// Writes the collection to `path` in the interchange format.
pub async fn export(store: &QuoteStore, path: &Path) -> Result<()> {
    let snapshot = store
        .export_snapshot()
        .context("Failed to serialize quotes")?;

    tokio::fs::write(path, &snapshot)
        .await
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;

    tracing::info!("Exported {} quotes to {}", store.len(), path.display());
    println!(
        "{}",
        ui::style_text(
            &format!("Exported {} quote(s) to {}", store.len(), path.display()),
            ui::StyleType::Success
        )
    );
    Ok(())
}
