use crate::core::ledger::{Ledger, Metal};
use crate::core::price::HistoricalPriceSource;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

/// Lower and upper bound of the factor applied to the spot price.
const JITTER: (f64, f64) = (0.95, 1.05);

/// Stand-in for a real price history: quotes the spot price with a random
/// offset of up to ±5%. Use a real source when past prices matter.
pub struct SimulatedPriceSource {
    spot: HashMap<Metal, f64>,
}

impl SimulatedPriceSource {
    pub fn new(spot: HashMap<Metal, f64>) -> Self {
        Self { spot }
    }

    /// Quotes around the spot prices currently held by `ledger`.
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self::new(
            Metal::ALL
                .iter()
                .map(|metal| (*metal, ledger.account(*metal).current_price()))
                .collect(),
        )
    }
}

#[async_trait]
impl HistoricalPriceSource for SimulatedPriceSource {
    async fn historical_price(&self, metal: Metal, date: NaiveDate) -> Result<f64> {
        let spot = self
            .spot
            .get(&metal)
            .copied()
            .ok_or_else(|| anyhow!("No spot price known for {metal}"))?;
        let price = spot * rand::thread_rng().gen_range(JITTER.0..JITTER.1);
        debug!(%metal, %date, spot, price, "Simulated historical price");
        Ok(price)
    }
}
