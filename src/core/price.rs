//! Pricing abstractions

use crate::core::ledger::Metal;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of per-gram prices for past dates.
#[async_trait]
pub trait HistoricalPriceSource: Send + Sync {
    async fn historical_price(&self, metal: Metal, date: NaiveDate) -> Result<f64>;
}
