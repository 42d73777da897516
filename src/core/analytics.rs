//! Aggregations over a metal account's transaction log.
//!
//! Nothing here is cached: every figure is recomputed from the full log so
//! the results always reflect the current state of the account.
use crate::core::error::LedgerError;
use crate::core::ledger::{MetalAccount, Transaction, TransactionKind};
use serde::Serialize;

/// Net investment and holdings weight of an account.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub total_investment: f64,
    pub total_weight: f64,
}

/// Buy and sell amounts reported separately as well as netted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistorySummary {
    pub total_buys: f64,
    pub total_sells: f64,
    pub net_investment: f64,
    pub current_holdings_weight: f64,
}

/// A display-ready line of the transaction history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub date: String,
    pub kind: TransactionKind,
    pub weight: f64,
    pub price_per_gram: f64,
    pub amount: f64,
    pub current_value: f64,
}

#[derive(Default)]
struct Sums {
    bought_amount: f64,
    sold_amount: f64,
    bought_weight: f64,
    sold_weight: f64,
}

// Buys and sells are summed apart and netted once, so `compute_totals` and
// `compute_history_summary` produce identical floats.
fn accumulate(transactions: &[Transaction]) -> Sums {
    transactions.iter().fold(Sums::default(), |mut sums, tx| {
        match tx.kind() {
            TransactionKind::Buy => {
                sums.bought_amount += tx.amount();
                sums.bought_weight += tx.weight();
            }
            TransactionKind::Sell => {
                sums.sold_amount += tx.amount();
                sums.sold_weight += tx.weight();
            }
        }
        sums
    })
}

pub fn compute_totals(account: &MetalAccount) -> Totals {
    let sums = accumulate(account.transactions());
    Totals {
        total_investment: sums.bought_amount - sums.sold_amount,
        total_weight: sums.bought_weight - sums.sold_weight,
    }
}

/// Market value of the current holdings at the account's spot price.
pub fn compute_current_value(account: &MetalAccount) -> f64 {
    compute_totals(account).total_weight * account.current_price()
}

pub fn compute_history_summary(account: &MetalAccount) -> HistorySummary {
    let sums = accumulate(account.transactions());
    HistorySummary {
        total_buys: sums.bought_amount,
        total_sells: sums.sold_amount,
        net_investment: sums.bought_amount - sums.sold_amount,
        current_holdings_weight: sums.bought_weight - sums.sold_weight,
    }
}

/// Price paid or received per gram.
///
/// Weight is validated positive on construction, so `Division` signals a
/// broken invariant rather than bad user input.
pub fn per_unit_price(transaction: &Transaction) -> Result<f64, LedgerError> {
    if transaction.weight() == 0.0 {
        return Err(LedgerError::Division);
    }
    Ok(transaction.amount() / transaction.weight())
}

/// Builds history lines for `transactions`, valuing each at the spot price
/// of `account`.
pub fn history_rows<'a, I>(
    account: &MetalAccount,
    transactions: I,
) -> Result<Vec<HistoryRow>, LedgerError>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .map(|tx| {
            Ok(HistoryRow {
                date: tx.date().to_string(),
                kind: tx.kind(),
                weight: tx.weight(),
                price_per_gram: per_unit_price(tx)?,
                amount: tx.amount(),
                current_value: tx.weight() * account.current_price(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::{Ledger, Metal};

    fn account_with(price: f64, entries: &[(TransactionKind, f64, f64)]) -> MetalAccount {
        let mut account = MetalAccount::new(price).unwrap();
        for (i, (kind, weight, amount)) in entries.iter().enumerate() {
            let tx = Transaction::new(*kind, *weight, *amount, "2024-01-01", i as i64).unwrap();
            account.push(tx);
        }
        account
    }

    #[test]
    fn test_empty_account() {
        let account = Ledger::default().account(Metal::Gold).clone();
        let totals = compute_totals(&account);
        assert_eq!(totals.total_investment, 0.0);
        assert_eq!(totals.total_weight, 0.0);
        assert_eq!(compute_current_value(&account), 0.0);
        assert_eq!(compute_history_summary(&account), HistorySummary::default());
    }

    #[test]
    fn test_single_buy() {
        let account = account_with(1950.0, &[(TransactionKind::Buy, 10.0, 19500.0)]);
        let totals = compute_totals(&account);
        assert_eq!(totals.total_investment, 19500.0);
        assert_eq!(totals.total_weight, 10.0);
        assert_eq!(compute_current_value(&account), 10.0 * 1950.0);
    }

    #[test]
    fn test_buy_then_sell() {
        let account = account_with(
            1950.0,
            &[
                (TransactionKind::Buy, 10.0, 10.0 * 1950.0),
                (TransactionKind::Sell, 4.0, 4.0 * 1950.0),
            ],
        );
        let totals = compute_totals(&account);
        assert_eq!(totals.total_weight, 6.0);
        assert_eq!(totals.total_investment, 19500.0 - 7800.0);
        assert_eq!(compute_current_value(&account), 6.0 * 1950.0);
    }

    #[test]
    fn test_history_summary_reports_buys_and_sells() {
        let account = account_with(
            25.0,
            &[
                (TransactionKind::Buy, 100.0, 2400.0),
                (TransactionKind::Sell, 30.0, 780.0),
                (TransactionKind::Buy, 10.0, 260.0),
            ],
        );
        let summary = compute_history_summary(&account);
        assert_eq!(summary.total_buys, 2660.0);
        assert_eq!(summary.total_sells, 780.0);
        assert_eq!(summary.net_investment, 1880.0);
        assert_eq!(summary.current_holdings_weight, 80.0);

        let totals = compute_totals(&account);
        assert_eq!(totals.total_investment, summary.net_investment);
        assert_eq!(totals.total_weight, summary.current_holdings_weight);
    }

    #[test]
    fn test_totals_are_idempotent() {
        let account = account_with(
            1950.0,
            &[
                (TransactionKind::Buy, 0.1, 195.3),
                (TransactionKind::Buy, 0.2, 390.7),
                (TransactionKind::Sell, 0.3, 600.1),
            ],
        );
        assert_eq!(compute_totals(&account), compute_totals(&account));
    }

    #[test]
    fn test_oversold_account_goes_negative() {
        let account = account_with(10.0, &[(TransactionKind::Sell, 5.0, 50.0)]);
        let totals = compute_totals(&account);
        assert_eq!(totals.total_weight, -5.0);
        assert_eq!(totals.total_investment, -50.0);
        assert_eq!(compute_current_value(&account), -50.0);
    }

    #[test]
    fn test_per_unit_price() {
        let tx = Transaction::new(TransactionKind::Buy, 4.0, 7800.0, "2024-01-01", 0).unwrap();
        assert_eq!(per_unit_price(&tx).unwrap(), 1950.0);
    }

    #[test]
    fn test_history_rows_value_at_spot() {
        let account = account_with(
            2000.0,
            &[
                (TransactionKind::Buy, 2.0, 3900.0),
                (TransactionKind::Sell, 1.0, 2100.0),
            ],
        );
        let rows = history_rows(&account, account.transactions()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].price_per_gram, 1950.0);
        assert_eq!(rows[0].current_value, 4000.0);
        assert_eq!(rows[1].kind, TransactionKind::Sell);
        assert_eq!(rows[1].price_per_gram, 2100.0);
        assert_eq!(rows[1].current_value, 2000.0);
    }
}
