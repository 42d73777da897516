pub mod simulated;
pub mod util;
pub mod yahoo_finance;

use crate::core::cache::PriceCache;
use crate::core::config::{AppConfig, PriceSourceKind};
use crate::core::ledger::Ledger;
use crate::core::price::HistoricalPriceSource;
use simulated::SimulatedPriceSource;
use tracing::debug;
use yahoo_finance::YahooHistoricalSource;

/// Builds the historical price source selected in `config`.
pub fn historical_source(config: &AppConfig, ledger: &Ledger) -> Box<dyn HistoricalPriceSource> {
    debug!(source = ?config.price_source, "Using historical price source");
    match config.price_source {
        PriceSourceKind::Simulated => Box::new(SimulatedPriceSource::from_ledger(ledger)),
        PriceSourceKind::Yahoo => Box::new(YahooHistoricalSource::new(
            &config.providers.yahoo.base_url,
            PriceCache::new(),
        )),
    }
}
