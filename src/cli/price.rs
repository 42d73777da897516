use super::ui;
use crate::core::builder::parse_positive;
use crate::core::currency::DisplayConverter;
use crate::core::ledger::Metal;
use crate::core::store::LedgerStore;
use anyhow::{Context, Result};

/// Sets the spot price per gram of `metal` from raw user input.
pub fn run(
    store: &mut LedgerStore,
    converter: &DisplayConverter,
    metal: Metal,
    input: &str,
) -> Result<()> {
    let price = parse_positive("price", input)?;
    store
        .set_spot_price(metal, price)
        .with_context(|| format!("Failed to update {metal} spot price"))?;
    println!(
        "{} spot price set to {}/g ({})",
        metal.title(),
        price,
        ui::style_text(&converter.format(price), ui::StyleType::TotalValue)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LedgerError;
    use crate::store::memory::MemoryStore;

    #[test]
    fn test_price_is_updated() {
        let mut store = LedgerStore::load(Box::new(MemoryStore::new())).unwrap();
        run(&mut store, &DisplayConverter::default(), Metal::Silver, "26.5").unwrap();
        assert_eq!(store.account(Metal::Silver).current_price(), 26.5);
        assert_eq!(store.account(Metal::Gold).current_price(), 1950.0);
    }

    #[test]
    fn test_zero_price_is_rejected() {
        let mut store = LedgerStore::load(Box::new(MemoryStore::new())).unwrap();
        let err = run(&mut store, &DisplayConverter::default(), Metal::Gold, "0").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::Validation { field: "price", .. })
        ));
        assert_eq!(store.account(Metal::Gold).current_price(), 1950.0);
    }
}
