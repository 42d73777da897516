use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::util::with_retry;
use crate::core::cache::PriceCache;
use crate::core::ledger::Metal;
use crate::core::price::HistoricalPriceSource;

pub const GRAMS_PER_TROY_OUNCE: f64 = 31.103_476_8;

/// Days of quotes requested after the target date, enough to get past
/// weekends and exchange holidays.
const LOOKAHEAD_DAYS: u64 = 7;

fn futures_symbol(metal: Metal) -> &'static str {
    match metal {
        Metal::Gold => "GC=F",
        Metal::Silver => "SI=F",
    }
}

/// First close at or after `target_ts`, skipping bars without a close.
fn find_closest_price(target_ts: i64, timestamps: &[i64], prices: &[Option<f64>]) -> Option<f64> {
    timestamps
        .iter()
        .zip(prices)
        .find_map(|(ts, price)| if *ts >= target_ts { *price } else { None })
}

/// Historical prices from the Yahoo Finance chart API, using the daily
/// close of the front-month futures contract. Quotes are per troy ounce and
/// converted to per gram.
pub struct YahooHistoricalSource {
    base_url: String,
    cache: PriceCache,
}

impl YahooHistoricalSource {
    pub fn new(base_url: &str, cache: PriceCache) -> Self {
        YahooHistoricalSource {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[async_trait]
impl HistoricalPriceSource for YahooHistoricalSource {
    #[instrument(name = "YahooHistoricalPrice", skip(self))]
    async fn historical_price(&self, metal: Metal, date: NaiveDate) -> Result<f64> {
        if let Some(cached) = self.cache.get(metal, date).await {
            return Ok(cached);
        }

        let symbol = futures_symbol(metal);
        let start = date.and_time(NaiveTime::MIN).and_utc().timestamp();
        let end = date
            .checked_add_days(Days::new(LOOKAHEAD_DAYS))
            .ok_or_else(|| anyhow!("Date out of range: {date}"))?
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&period1={}&period2={}",
            self.base_url, symbol, start, end
        );
        debug!("Requesting historical prices from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("bullion/1.0")
            .build()?;
        let response = with_retry(|| client.get(&url).send(), 3, 500)
            .await
            .with_context(|| format!("Request failed for symbol: {symbol}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        let per_ounce = data
            .chart
            .result
            .as_ref()
            .and_then(|items| items.first())
            .and_then(|item| {
                let timestamps = item.timestamp.as_ref()?;
                let closes = item
                    .indicators
                    .as_ref()?
                    .quote
                    .first()?
                    .close
                    .as_ref()?;
                find_closest_price(start, timestamps, closes)
            })
            .ok_or_else(|| anyhow!("No price data found for {} on {}", symbol, date))?;

        let price = per_ounce / GRAMS_PER_TROY_OUNCE;
        self.cache.put(metal, date, price).await;
        Ok(price)
    }
}
