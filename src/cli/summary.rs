use super::ui;
use crate::core::analytics;
use crate::core::currency::DisplayConverter;
use crate::core::ledger::{Metal, MetalAccount};
use crate::core::store::LedgerStore;
use anyhow::Result;
use comfy_table::Cell;

/// Holdings figures of one metal, in the ledger's native currency.
#[derive(Debug, Clone, PartialEq)]
pub struct MetalSummary {
    pub metal: Metal,
    pub spot_price: f64,
    pub total_investment: f64,
    pub holdings_weight: f64,
    pub current_value: f64,
}

impl MetalSummary {
    pub fn from_account(metal: Metal, account: &MetalAccount) -> Self {
        let totals = analytics::compute_totals(account);
        MetalSummary {
            metal,
            spot_price: account.current_price(),
            total_investment: totals.total_investment,
            holdings_weight: totals.total_weight,
            current_value: analytics::compute_current_value(account),
        }
    }

    pub fn gain(&self) -> f64 {
        self.current_value - self.total_investment
    }
}

pub fn display_as_table(summaries: &[MetalSummary], converter: &DisplayConverter) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Metal"),
        ui::header_cell(&format!("Spot ({}/g)", converter.code)),
        ui::header_cell("Holdings (g)"),
        ui::header_cell(&format!("Invested ({})", converter.code)),
        ui::header_cell(&format!("Value ({})", converter.code)),
        ui::header_cell("Gain/Loss"),
    ]);

    for summary in summaries {
        table.add_row(vec![
            Cell::new(summary.metal.title()),
            ui::number_cell(converter.format(summary.spot_price)),
            ui::number_cell(format!("{:.2}g", summary.holdings_weight)),
            ui::number_cell(converter.format(summary.total_investment)),
            ui::number_cell(converter.format(summary.current_value)),
            ui::change_cell(converter.format(summary.gain()), summary.gain()),
        ]);
    }

    let total_value: f64 = summaries.iter().map(|s| s.current_value).sum();
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Holdings Summary", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\nTotal Value ({}): {}",
        ui::style_text(&converter.code, ui::StyleType::TotalLabel),
        ui::style_text(&converter.format(total_value), ui::StyleType::TotalValue)
    ));
    output
}

pub fn run(store: &LedgerStore, converter: &DisplayConverter, metals: &[Metal]) -> Result<()> {
    let summaries: Vec<MetalSummary> = metals
        .iter()
        .map(|metal| MetalSummary::from_account(*metal, store.account(*metal)))
        .collect();
    println!("{}", display_as_table(&summaries, converter));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::{Transaction, TransactionKind};

    #[test]
    fn test_summary_from_account() {
        let mut account = MetalAccount::new(2000.0).unwrap();
        let buy = Transaction::new(TransactionKind::Buy, 10.0, 19500.0, "2024-01-01", 1).unwrap();
        let sell = Transaction::new(TransactionKind::Sell, 4.0, 7800.0, "2024-02-01", 2).unwrap();
        account.push(buy);
        account.push(sell);

        let summary = MetalSummary::from_account(Metal::Gold, &account);
        assert_eq!(summary.spot_price, 2000.0);
        assert_eq!(summary.holdings_weight, 6.0);
        assert_eq!(summary.total_investment, 11700.0);
        assert_eq!(summary.current_value, 12000.0);
        assert_eq!(summary.gain(), 300.0);
    }

    #[test]
    fn test_table_uses_display_currency() {
        let summary = MetalSummary {
            metal: Metal::Silver,
            spot_price: 20.0,
            total_investment: 100.0,
            holdings_weight: 5.0,
            current_value: 100.0,
        };
        let output = console::strip_ansi_codes(&display_as_table(
            &[summary],
            &DisplayConverter::default(),
        ))
        .to_string();

        assert!(output.contains("Silver"));
        assert!(output.contains("₹1650.00"));
        assert!(output.contains("5.00g"));
        assert!(output.contains("Total Value (INR): ₹8250.00"));
    }
}
