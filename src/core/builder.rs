//! Turns raw trade input into a transaction ready to be recorded.
//!
//! A trade is entered either by weight or by amount, for today or for a
//! past date. The missing side is derived from the price at that date: the
//! spot price for today, otherwise a historical price from the ledger's
//! memo or from a [`HistoricalPriceSource`]. Building never mutates the
//! ledger, so a rejected trade leaves no trace.
use crate::core::error::{LedgerError, ensure_positive};
use crate::core::ledger::{Metal, MetalAccount, TransactionKind, format_date};
use crate::core::price::HistoricalPriceSource;
use anyhow::anyhow;
use chrono::NaiveDate;
use tracing::debug;

/// Which quantity the user typed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    /// Grams entered; amount is derived.
    Weight,
    /// Currency amount entered; grams are derived.
    Amount,
}

impl EntryMode {
    fn field(&self) -> &'static str {
        match self {
            EntryMode::Weight => "weight",
            EntryMode::Amount => "amount",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateMode {
    Today,
    On(NaiveDate),
}

#[derive(Debug, Clone)]
pub struct TradeRequest {
    pub kind: TransactionKind,
    pub entry: EntryMode,
    pub input: String,
    pub date: DateMode,
}

/// Where the per-gram price of a trade came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOrigin {
    Spot,
    /// Reused from the account's memo of earlier lookups.
    Recorded,
    /// Freshly resolved by the historical price source.
    Lookup,
}

/// A validated trade, not yet part of the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeEntry {
    pub kind: TransactionKind,
    pub weight: f64,
    pub amount: f64,
    pub date: String,
    pub price_per_gram: f64,
    pub origin: PriceOrigin,
}

/// Parses user input that must be a finite number above zero.
pub fn parse_positive(field: &'static str, input: &str) -> Result<f64, LedgerError> {
    let value = input
        .trim()
        .parse::<f64>()
        .map_err(|_| LedgerError::validation(field, format!("'{input}' is not a number")))?;
    ensure_positive(field, value)
}

pub async fn build_transaction(
    account: &MetalAccount,
    metal: Metal,
    request: &TradeRequest,
    source: &dyn HistoricalPriceSource,
    today: NaiveDate,
) -> Result<TradeEntry, LedgerError> {
    let value = parse_positive(request.entry.field(), &request.input)?;

    let (date, price, origin) = match request.date {
        DateMode::Today => (today, account.current_price(), PriceOrigin::Spot),
        DateMode::On(date) => {
            if date > today {
                return Err(LedgerError::validation(
                    "date",
                    format!("{date} is in the future"),
                ));
            }
            match account.historical_price(&format_date(date)) {
                Some(price) => (date, price, PriceOrigin::Recorded),
                None => {
                    debug!(%metal, %date, "Resolving historical price");
                    let price = source
                        .historical_price(metal, date)
                        .await
                        .map_err(LedgerError::PriceLookup)?;
                    (date, price, PriceOrigin::Lookup)
                }
            }
        }
    };

    if !(price.is_finite() && price > 0.0) {
        return Err(LedgerError::PriceLookup(anyhow!(
            "invalid price {price} for {metal} on {date}"
        )));
    }

    let (weight, amount) = match request.entry {
        EntryMode::Weight => (value, value * price),
        EntryMode::Amount => (value / price, value),
    };

    Ok(TradeEntry {
        kind: request.kind,
        weight: ensure_positive("weight", weight)?,
        amount: ensure_positive("amount", amount)?,
        date: format_date(date),
        price_per_gram: price,
        origin,
    })
}
