//! Time-window filtering of a transaction log.

use crate::core::error::LedgerError;
use crate::core::ledger::{MetalAccount, Transaction};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    All,
    Week,
    Month,
    Year,
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Period::All => "all",
                Period::Week => "week",
                Period::Month => "month",
                Period::Year => "year",
            }
        )
    }
}

impl Period {
    /// How far back the window reaches; `None` for the unbounded window.
    pub fn to_duration(&self) -> Option<Duration> {
        match self {
            Period::All => None,
            Period::Week => Some(Duration::days(7)),
            Period::Month => Some(Duration::days(30)),
            Period::Year => Some(Duration::days(365)),
        }
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.to_duration().map(|lookback| now - lookback)
    }
}

impl FromStr for Period {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Period::All),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            _ => Err(LedgerError::validation(
                "period",
                format!("unknown period '{s}', expected all, week, month or year"),
            )),
        }
    }
}

/// Returns the transactions of `account` dated within `period` of `now`,
/// in log order.
///
/// The boundary is inclusive. Any transaction whose date cannot be parsed
/// fails the whole call with [`LedgerError::Parse`].
pub fn filter_by_period(
    account: &MetalAccount,
    period: Period,
    now: DateTime<Utc>,
) -> Result<Vec<&Transaction>, LedgerError> {
    let Some(cutoff) = period.cutoff(now) else {
        return Ok(account.transactions().iter().collect());
    };

    let mut selected = Vec::new();
    for tx in account.transactions() {
        if tx.date_instant()? >= cutoff {
            selected.push(tx);
        }
    }
    Ok(selected)
}
