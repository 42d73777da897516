//! Ledger data model: metals, transactions and per-metal accounts.

use super::error::{LedgerError, ensure_positive};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

pub const GOLD_SEED_PRICE: f64 = 1950.00;
pub const SILVER_SEED_PRICE: f64 = 24.50;

/// Calendar date formats accepted in stored transactions, newest first.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver,
}

impl Metal {
    pub const ALL: [Metal; 2] = [Metal::Gold, Metal::Silver];

    /// Spot price per gram used when no ledger exists yet.
    pub fn seed_price(&self) -> f64 {
        match self {
            Metal::Gold => GOLD_SEED_PRICE,
            Metal::Silver => SILVER_SEED_PRICE,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Metal::Gold => "Gold",
            Metal::Silver => "Silver",
        }
    }
}

impl Display for Metal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Metal::Gold => "gold",
                Metal::Silver => "silver",
            }
        )
    }
}

impl FromStr for Metal {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gold" => Ok(Metal::Gold),
            "silver" => Ok(Metal::Silver),
            _ => Err(LedgerError::validation(
                "metal",
                format!("unknown metal '{s}', expected gold or silver"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Buy,
    Sell,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TransactionKind::Buy => "BUY",
                TransactionKind::Sell => "SELL",
            }
        )
    }
}

/// A single buy or sell of metal. Weight and amount are always positive;
/// the direction lives in `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTransaction")]
pub struct Transaction {
    #[serde(rename = "type")]
    kind: TransactionKind,
    weight: f64,
    amount: f64,
    date: String,
    timestamp: i64,
}

#[derive(Deserialize)]
struct RawTransaction {
    #[serde(rename = "type")]
    kind: TransactionKind,
    weight: f64,
    amount: f64,
    date: String,
    timestamp: i64,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = LedgerError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        Transaction::new(raw.kind, raw.weight, raw.amount, raw.date, raw.timestamp)
    }
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        weight: f64,
        amount: f64,
        date: impl Into<String>,
        timestamp: i64,
    ) -> Result<Self, LedgerError> {
        Ok(Self {
            kind,
            weight: ensure_positive("weight", weight)?,
            amount: ensure_positive("amount", amount)?,
            date: date.into(),
            timestamp,
        })
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Weight in grams.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    /// Creation instant in milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn date_instant(&self) -> Result<DateTime<Utc>, LedgerError> {
        parse_date_instant(&self.date)
    }
}

/// Interprets a stored transaction date as an instant.
///
/// Accepts RFC 3339 instants, ISO calendar dates and the `M/D/YYYY` form
/// written by older snapshots. Calendar dates resolve to UTC midnight.
pub fn parse_date_instant(date: &str) -> Result<DateTime<Utc>, LedgerError> {
    let trimmed = date.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(|day| day.and_time(NaiveTime::MIN).and_utc())
        .ok_or_else(|| LedgerError::Parse(date.to_string()))
}

/// Format used for dates written by this crate.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMATS[0]).to_string()
}

/// One metal's transaction log and spot price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawAccount")]
pub struct MetalAccount {
    transactions: Vec<Transaction>,
    current_price: f64,
    historical_prices: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAccount {
    transactions: Vec<Transaction>,
    current_price: f64,
    #[serde(default)]
    historical_prices: BTreeMap<String, f64>,
}

impl TryFrom<RawAccount> for MetalAccount {
    type Error = LedgerError;

    fn try_from(raw: RawAccount) -> Result<Self, Self::Error> {
        ensure_positive("currentPrice", raw.current_price)?;
        for price in raw.historical_prices.values() {
            ensure_positive("historicalPrices", *price)?;
        }
        Ok(Self {
            transactions: raw.transactions,
            current_price: raw.current_price,
            historical_prices: raw.historical_prices,
        })
    }
}

impl MetalAccount {
    pub fn new(current_price: f64) -> Result<Self, LedgerError> {
        Ok(Self {
            transactions: Vec::new(),
            current_price: ensure_positive("price", current_price)?,
            historical_prices: BTreeMap::new(),
        })
    }

    fn seeded(metal: Metal) -> Self {
        Self {
            transactions: Vec::new(),
            current_price: metal.seed_price(),
            historical_prices: BTreeMap::new(),
        }
    }

    /// Transactions in the order they were entered.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Spot price per gram.
    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    /// Previously resolved price for an ISO date, if any.
    pub fn historical_price(&self, date: &str) -> Option<f64> {
        self.historical_prices.get(date).copied()
    }

    pub(crate) fn push(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub(crate) fn pop(&mut self) -> Option<Transaction> {
        self.transactions.pop()
    }

    pub(crate) fn take_transactions(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }

    pub(crate) fn restore_transactions(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
    }

    pub(crate) fn set_current_price(&mut self, price: f64) -> Result<f64, LedgerError> {
        let previous = self.current_price;
        self.current_price = ensure_positive("price", price)?;
        Ok(previous)
    }

    pub(crate) fn remember_price(&mut self, date: &str, price: f64) -> Option<f64> {
        self.historical_prices.insert(date.to_string(), price)
    }

    pub(crate) fn forget_price(&mut self, date: &str) {
        self.historical_prices.remove(date);
    }
}

/// The complete persisted state: one account per metal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    gold: MetalAccount,
    silver: MetalAccount,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            gold: MetalAccount::seeded(Metal::Gold),
            silver: MetalAccount::seeded(Metal::Silver),
        }
    }
}

impl Ledger {
    pub fn account(&self, metal: Metal) -> &MetalAccount {
        match metal {
            Metal::Gold => &self.gold,
            Metal::Silver => &self.silver,
        }
    }

    pub(crate) fn account_mut(&mut self, metal: Metal) -> &mut MetalAccount {
        match metal {
            Metal::Gold => &mut self.gold,
            Metal::Silver => &mut self.silver,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, LedgerError> {
        serde_json::to_vec(self).map_err(|e| LedgerError::Storage(e.into()))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, LedgerError> {
        serde_json::from_slice(bytes).map_err(|e| LedgerError::Persistence(e.to_string()))
    }
}
