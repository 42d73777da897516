use crate::core::ledger::Metal;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Per-gram prices already resolved for a metal and date, shared between
/// clones.
#[derive(Clone, Default)]
pub struct PriceCache {
    inner: Arc<Mutex<HashMap<(Metal, NaiveDate), f64>>>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, metal: Metal, date: NaiveDate) -> Option<f64> {
        let cache = self.inner.lock().await;
        let value = cache.get(&(metal, date)).copied();
        if value.is_some() {
            debug!(%metal, %date, "Price cache HIT");
        } else {
            debug!(%metal, %date, "Price cache MISS");
        }
        value
    }

    pub async fn put(&self, metal: Metal, date: NaiveDate, price: f64) {
        let mut cache = self.inner.lock().await;
        debug!(%metal, %date, price, "Price cache PUT");
        cache.insert((metal, date), price);
    }
}
