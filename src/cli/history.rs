use super::ui;
use crate::core::analytics::{self, HistoryRow, HistorySummary};
use crate::core::currency::DisplayConverter;
use crate::core::history::{Period, filter_by_period};
use crate::core::ledger::Metal;
use crate::core::store::LedgerStore;
use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::Cell;

fn summary_cards(summary: &HistorySummary, converter: &DisplayConverter) -> String {
    let card = |label: &str, value: String| {
        format!(
            "{}: {}",
            ui::style_text(label, ui::StyleType::TotalLabel),
            ui::style_text(&value, ui::StyleType::TotalValue)
        )
    };
    [
        card("Total Buys", converter.format(summary.total_buys)),
        card("Total Sells", converter.format(summary.total_sells)),
        card("Net Investment", converter.format(summary.net_investment)),
        card(
            "Current Holdings",
            format!("{:.2}g", summary.current_holdings_weight),
        ),
    ]
    .join("\n")
}

pub fn display_as_table(
    metal: Metal,
    period: Period,
    rows: &[HistoryRow],
    summary: &HistorySummary,
    converter: &DisplayConverter,
) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text(
            &format!("{} Transaction History ({period})", metal.title()),
            ui::StyleType::Title
        )
    );

    if rows.is_empty() {
        output.push_str(&ui::style_text(
            "No transactions found for this period.",
            ui::StyleType::Subtle,
        ));
    } else {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Type"),
            ui::header_cell("Weight (g)"),
            ui::header_cell(&format!("Price/g ({})", converter.code)),
            ui::header_cell(&format!("Amount ({})", converter.code)),
            ui::header_cell(&format!("Current Value ({})", converter.code)),
        ]);
        for row in rows {
            table.add_row(vec![
                Cell::new(&row.date),
                ui::kind_cell(row.kind),
                ui::number_cell(format!("{:.2}", row.weight)),
                ui::number_cell(converter.format(row.price_per_gram)),
                ui::number_cell(converter.format(row.amount)),
                ui::number_cell(converter.format(row.current_value)),
            ]);
        }
        output.push_str(&table.to_string());
    }

    output.push_str("\n\n");
    output.push_str(&summary_cards(summary, converter));
    output
}

/// Prints the `metal` log within `period` followed by the all-time summary.
pub fn run(
    store: &LedgerStore,
    converter: &DisplayConverter,
    metal: Metal,
    period: Period,
) -> Result<()> {
    let account = store.account(metal);
    let selected = filter_by_period(account, period, Utc::now())
        .with_context(|| format!("Failed to filter {metal} history"))?;
    let rows = analytics::history_rows(account, selected)?;
    let summary = analytics::compute_history_summary(account);
    println!(
        "{}",
        display_as_table(metal, period, &rows, &summary, converter)
    );
    Ok(())
}
