use super::ui;
use crate::core::quote_store::{LAST_FILTER_KEY, QUOTES_KEY};
use crate::core::storage::KeyValueCollection;
use crate::core::{CategoryFilter, QuoteStore};
use anyhow::Result;

/// Resolves the filter to use: an explicit one is remembered, otherwise the
/// last remembered filter applies.
async fn resolve_filter(store: &QuoteStore, category: Option<&str>) -> Result<CategoryFilter> {
    match category {
        Some(category) => {
            let filter: CategoryFilter = category.parse()?;
            store.set_last_filter(&filter).await;
            Ok(filter)
        }
        None => Ok(store.last_filter().await),
    }
}

/// Displays one random quote from the selected category.
pub async fn show(store: &QuoteStore, category: Option<&str>) -> Result<()> {
    let filter = resolve_filter(store, category).await?;
    match store.pick_random(&filter).await {
        Some(quote) => println!("{}", ui::format_quote(&quote)),
        None => println!(
            "{}",
            ui::style_text(
                &format!("No quotes found in category {filter}."),
                ui::StyleType::Subtle
            )
        ),
    }
    Ok(())
}

pub async fn list(store: &QuoteStore, category: Option<&str>) -> Result<()> {
    let filter = resolve_filter(store, category).await?;
    let rows = store
        .quotes()
        .iter()
        .enumerate()
        .filter(|(_, quote)| filter.matches(quote));

    println!(
        "Quotes: {}\n",
        ui::style_text(&filter.to_string(), ui::StyleType::Title)
    );
    println!("{}", ui::quotes_table(rows));
    Ok(())
}

/// Prints the available filters, marking the remembered one.
pub async fn categories(store: &QuoteStore) -> Result<()> {
    let selected = store.last_filter().await;
    let filters = std::iter::once(CategoryFilter::All).chain(
        store
            .categories()
            .into_iter()
            .map(CategoryFilter::Category),
    );

    for filter in filters {
        if filter == selected {
            println!("* {}", ui::style_text(&filter.to_string(), ui::StyleType::Category));
        } else {
            println!("  {filter}");
        }
    }
    Ok(())
}

pub async fn add(store: &mut QuoteStore, text: &str, category: &str) -> Result<()> {
    let quote = store.add(text, category).await?;
    println!(
        "{}\n{}",
        ui::style_text("Quote added!", ui::StyleType::Success),
        ui::format_quote(&quote)
    );
    Ok(())
}

/// Clears the durable copy of the collection and the remembered filter. The
/// next start falls back to the seed quotes.
pub async fn reset(local: &dyn KeyValueCollection) -> Result<()> {
    local.remove(QUOTES_KEY).await;
    local.remove(LAST_FILTER_KEY).await;
    tracing::info!("Cleared stored quotes");
    println!(
        "{}",
        ui::style_text("Stored quotes cleared.", ui::StyleType::Success)
    );
    Ok(())
}
