use super::ui;
use crate::core::ledger::Metal;
use crate::core::store::LedgerStore;
use anyhow::{Context, Result};

/// Clears `metal`'s history once the user agrees. `confirmed` skips the
/// prompt.
pub fn run(store: &mut LedgerStore, metal: Metal, confirmed: bool) -> Result<()> {
    if !confirmed {
        let prompt = format!(
            "Are you sure you want to clear all {metal} transaction history? This cannot be undone."
        );
        if !ui::confirm(&prompt)? {
            println!("{}", ui::style_text("Aborted.", ui::StyleType::Subtle));
            return Ok(());
        }
    }

    let removed = store
        .clear_history(metal)
        .with_context(|| format!("Failed to clear {metal} history"))?;
    println!(
        "{} Removed {removed} {metal} transaction(s).",
        ui::style_text("History cleared.", ui::StyleType::Title)
    );
    Ok(())
}
