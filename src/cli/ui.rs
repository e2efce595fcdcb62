use crate::core::{QuoteRecord, ReconcileOutcome};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Quote,
    Category,
    Success,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Quote => style(text).italic(),
        StyleType::Category => style(text).cyan(),
        StyleType::Success => style(text).green(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// A table listing quotes with their position in the collection.
pub fn quotes_table<'a>(quotes: impl IntoIterator<Item = (usize, &'a QuoteRecord)>) -> Table {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Quote"),
        header_cell("Category"),
    ]);
    for (index, quote) in quotes {
        table.add_row(vec![
            Cell::new(index + 1).fg(Color::DarkGrey),
            Cell::new(&quote.text),
            Cell::new(&quote.category).fg(Color::Cyan),
        ]);
    }
    table
}

/// Renders a single quote the way `show` displays it.
pub fn format_quote(quote: &QuoteRecord) -> String {
    format!(
        "{}\n{} {}",
        style_text(&quote.text, StyleType::Quote),
        style_text("Category:", StyleType::Subtle),
        style_text(&quote.category, StyleType::Category)
    )
}

/// A timestamped one-line notification for a sync outcome.
pub fn sync_notification(outcome: &ReconcileOutcome) -> String {
    let stamp = chrono::Local::now().format("%H:%M:%S").to_string();
    let message = outcome.to_string();
    let styled = match outcome {
        ReconcileOutcome::Updated { .. } => style_text(&message, StyleType::Success),
        ReconcileOutcome::NoChange => style_text(&message, StyleType::Subtle),
        ReconcileOutcome::Failed { .. } => style_text(&format!("⚠ {message}"), StyleType::Error),
    };
    format!("{} {}", style_text(&format!("[{stamp}]"), StyleType::Subtle), styled)
}

/// Creates a spinner shown while waiting on the server.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
