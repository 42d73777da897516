use super::ui;
use crate::core::builder::{self, DateMode, PriceOrigin, TradeEntry, TradeRequest};
use crate::core::currency::DisplayConverter;
use crate::core::ledger::{Metal, TransactionKind};
use crate::core::price::HistoricalPriceSource;
use crate::core::store::LedgerStore;
use anyhow::{Context, Result};
use chrono::Local;

fn confirmation(metal: Metal, entry: &TradeEntry, converter: &DisplayConverter) -> String {
    let headline = match entry.kind {
        TransactionKind::Buy => "Purchase recorded successfully!",
        TransactionKind::Sell => "Sale recorded successfully!",
    };
    let origin = match entry.origin {
        PriceOrigin::Spot => "spot price",
        PriceOrigin::Recorded => "recorded price",
        PriceOrigin::Lookup => "historical price",
    };
    format!(
        "{}\n{:.2}g of {} for {} on {} ({} {}/g)",
        ui::style_text(headline, ui::StyleType::Title),
        entry.weight,
        metal,
        converter.format(entry.amount),
        entry.date,
        ui::style_text(origin, ui::StyleType::Subtle),
        converter.format(entry.price_per_gram),
    )
}

/// Builds the trade described by `request` and records it on `metal`.
pub async fn run(
    store: &mut LedgerStore,
    source: &dyn HistoricalPriceSource,
    converter: &DisplayConverter,
    metal: Metal,
    request: &TradeRequest,
) -> Result<()> {
    let today = Local::now().date_naive();

    let spinner = match request.date {
        DateMode::On(date) => Some(ui::new_spinner(&format!(
            "Fetching {metal} price for {date}..."
        ))),
        DateMode::Today => None,
    };
    let built =
        builder::build_transaction(store.account(metal), metal, request, source, today).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let entry = built.with_context(|| format!("Failed to build {metal} transaction"))?;

    store
        .record_entry(metal, &entry)
        .with_context(|| format!("Failed to record {metal} transaction"))?;
    println!("{}", confirmation(metal, &entry, converter));
    Ok(())
}
