//! Ledger persistence.
//!
//! The whole [`Ledger`] is stored as one JSON blob under [`SNAPSHOT_KEY`]
//! in a [`BlobStore`]. Every mutation rewrites the blob with a single put,
//! so readers only ever see complete snapshots.
use crate::core::builder::{PriceOrigin, TradeEntry};
use crate::core::error::LedgerError;
use crate::core::ledger::{
    Ledger, Metal, MetalAccount, Transaction, TransactionKind, parse_date_instant,
};
use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

pub const SNAPSHOT_KEY: &str = "metalsDB";
/// Where an undecodable snapshot is parked before defaults replace it.
pub const CORRUPT_SNAPSHOT_KEY: &str = "metalsDB.corrupt";

/// A flat key-value store holding opaque blobs.
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// Owns the ledger for a session and keeps its persisted snapshot in sync.
pub struct LedgerStore {
    ledger: Ledger,
    backend: Box<dyn BlobStore>,
}

impl LedgerStore {
    /// Loads the persisted ledger, falling back to defaults.
    ///
    /// A missing, unreadable or malformed snapshot is not an error: the
    /// default ledger is installed and written back. Only a failure to write
    /// that default is returned.
    pub fn load(backend: Box<dyn BlobStore>) -> Result<Self, LedgerError> {
        let loaded = match backend.get(SNAPSHOT_KEY) {
            Ok(Some(bytes)) => match Ledger::from_json(&bytes) {
                Ok(ledger) => Some(ledger),
                Err(e) => {
                    warn!(error = %e, "Discarding malformed ledger snapshot");
                    if let Err(e) = backend.put(CORRUPT_SNAPSHOT_KEY, &bytes) {
                        warn!(error = %e, "Could not preserve malformed snapshot");
                    }
                    None
                }
            },
            Ok(None) => {
                debug!("No ledger snapshot found, starting fresh");
                None
            }
            Err(e) => {
                let e = LedgerError::Persistence(format!("{e:#}"));
                warn!(error = %e, "Could not read ledger snapshot");
                None
            }
        };

        let store = match loaded {
            Some(ledger) => {
                debug!("Loaded ledger snapshot");
                Self { ledger, backend }
            }
            None => {
                let store = Self {
                    ledger: Ledger::default(),
                    backend,
                };
                store.save()?;
                store
            }
        };
        Ok(store)
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let bytes = self.ledger.to_json()?;
        self.backend
            .put(SNAPSHOT_KEY, &bytes)
            .map_err(LedgerError::Storage)?;
        debug!(bytes = bytes.len(), "Saved ledger snapshot");
        Ok(())
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn account(&self, metal: Metal) -> &MetalAccount {
        self.ledger.account(metal)
    }

    /// Validates and appends a transaction dated `date`, then persists.
    ///
    /// If persisting fails the append is undone and the error returned.
    pub fn record_transaction(
        &mut self,
        metal: Metal,
        kind: TransactionKind,
        weight: f64,
        amount: f64,
        date: &str,
    ) -> Result<&Transaction, LedgerError> {
        self.append(metal, kind, weight, amount, date)?;
        self.last_transaction(metal)
    }

    /// Records a built trade. A freshly looked-up historical price is kept
    /// in the account's memo, in the same snapshot as the transaction.
    pub fn record_entry(
        &mut self,
        metal: Metal,
        entry: &TradeEntry,
    ) -> Result<&Transaction, LedgerError> {
        let remembered = entry.origin == PriceOrigin::Lookup
            && self
                .ledger
                .account_mut(metal)
                .remember_price(&entry.date, entry.price_per_gram)
                .is_none();

        let appended = self.append(metal, entry.kind, entry.weight, entry.amount, &entry.date);
        if let Err(e) = appended {
            if remembered {
                self.ledger.account_mut(metal).forget_price(&entry.date);
            }
            return Err(e);
        }
        self.last_transaction(metal)
    }

    fn append(
        &mut self,
        metal: Metal,
        kind: TransactionKind,
        weight: f64,
        amount: f64,
        date: &str,
    ) -> Result<(), LedgerError> {
        parse_date_instant(date)
            .map_err(|_| LedgerError::validation("date", format!("'{date}' is not a date")))?;
        let transaction =
            Transaction::new(kind, weight, amount, date, Utc::now().timestamp_millis())?;

        self.ledger.account_mut(metal).push(transaction);
        if let Err(e) = self.save() {
            self.ledger.account_mut(metal).pop();
            return Err(e);
        }
        info!(%metal, %kind, weight, amount, date, "Recorded transaction");
        Ok(())
    }

    fn last_transaction(&self, metal: Metal) -> Result<&Transaction, LedgerError> {
        self.ledger
            .account(metal)
            .transactions()
            .last()
            .ok_or_else(|| LedgerError::Persistence("appended transaction missing".into()))
    }

    /// Empties `metal`'s transaction log and persists. Returns how many
    /// transactions were removed.
    pub fn clear_history(&mut self, metal: Metal) -> Result<usize, LedgerError> {
        let removed = self.ledger.account_mut(metal).take_transactions();
        if let Err(e) = self.save() {
            self.ledger.account_mut(metal).restore_transactions(removed);
            return Err(e);
        }
        info!(%metal, removed = removed.len(), "Cleared transaction history");
        Ok(removed.len())
    }

    /// Updates the spot price per gram and persists.
    pub fn set_spot_price(&mut self, metal: Metal, price: f64) -> Result<(), LedgerError> {
        let previous = self.ledger.account_mut(metal).set_current_price(price)?;
        if let Err(e) = self.save() {
            self.ledger.account_mut(metal).set_current_price(previous)?;
            return Err(e);
        }
        info!(%metal, previous, price, "Updated spot price");
        Ok(())
    }

    /// Final save at the end of a session.
    pub fn close(self) -> Result<(), LedgerError> {
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use anyhow::anyhow;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Wraps a shared memory store so tests can inspect it after the ledger
    /// store takes ownership, and can make writes fail on demand.
    #[derive(Clone, Default)]
    struct SharedStore {
        inner: Arc<MemoryStore>,
        fail_writes: Arc<AtomicBool>,
    }

    impl BlobStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &[u8]) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(anyhow!("disk full"));
            }
            self.inner.put(key, value)
        }
    }

    struct UnreadableStore;

    impl BlobStore for UnreadableStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(anyhow!("permission denied"))
        }

        fn put(&self, _key: &str, _value: &[u8]) -> Result<()> {
            Ok(())
        }
    }

    fn persisted(shared: &SharedStore) -> Ledger {
        let bytes = shared.get(SNAPSHOT_KEY).unwrap().expect("snapshot missing");
        Ledger::from_json(&bytes).unwrap()
    }

    fn entry(kind: TransactionKind, weight: f64, amount: f64, date: &str) -> TradeEntry {
        TradeEntry {
            kind,
            weight,
            amount,
            date: date.to_string(),
            price_per_gram: amount / weight,
            origin: PriceOrigin::Lookup,
        }
    }

    #[test]
    fn test_load_missing_snapshot_persists_defaults() {
        let shared = SharedStore::default();
        let store = LedgerStore::load(Box::new(shared.clone())).unwrap();
        assert_eq!(store.ledger(), &Ledger::default());
        assert_eq!(persisted(&shared), Ledger::default());
    }

    #[test]
    fn test_load_malformed_snapshot_resets_and_preserves_blob() {
        let shared = SharedStore::default();
        shared.put(SNAPSHOT_KEY, b"{not json").unwrap();

        let store = LedgerStore::load(Box::new(shared.clone())).unwrap();
        assert_eq!(store.ledger(), &Ledger::default());
        assert_eq!(persisted(&shared), Ledger::default());
        assert_eq!(
            shared.get(CORRUPT_SNAPSHOT_KEY).unwrap().as_deref(),
            Some(&b"{not json"[..])
        );
    }

    #[test]
    fn test_load_unreadable_backend_falls_back_to_defaults() {
        let store = LedgerStore::load(Box::new(UnreadableStore)).unwrap();
        assert_eq!(store.ledger(), &Ledger::default());
    }

    #[test]
    fn test_load_fails_when_defaults_cannot_be_written() {
        let shared = SharedStore::default();
        shared.fail_writes.store(true, Ordering::SeqCst);
        assert!(matches!(
            LedgerStore::load(Box::new(shared)),
            Err(LedgerError::Storage(_))
        ));
    }

    #[test]
    fn test_record_transaction_persists_and_reloads() {
        let shared = SharedStore::default();
        let mut store = LedgerStore::load(Box::new(shared.clone())).unwrap();

        let tx = store
            .record_transaction(
                Metal::Gold,
                TransactionKind::Buy,
                10.0,
                19500.0,
                "2024-06-01",
            )
            .unwrap();
        assert_eq!(tx.weight(), 10.0);
        assert!(tx.timestamp() > 0);

        let reloaded = LedgerStore::load(Box::new(shared.clone())).unwrap();
        assert_eq!(reloaded.ledger(), store.ledger());
        assert_eq!(reloaded.account(Metal::Gold).transactions().len(), 1);
    }

    #[test]
    fn test_record_transaction_rejects_invalid_values() {
        let shared = SharedStore::default();
        let mut store = LedgerStore::load(Box::new(shared.clone())).unwrap();

        let result =
            store.record_transaction(Metal::Gold, TransactionKind::Buy, 0.0, 100.0, "2024-06-01");
        assert!(matches!(
            result,
            Err(LedgerError::Validation { field: "weight", .. })
        ));
        let result =
            store.record_transaction(Metal::Gold, TransactionKind::Sell, 1.0, -5.0, "2024-06-01");
        assert!(matches!(
            result,
            Err(LedgerError::Validation { field: "amount", .. })
        ));

        assert!(store.account(Metal::Gold).transactions().is_empty());
        assert_eq!(persisted(&shared), Ledger::default());
    }

    #[test]
    fn test_record_transaction_rejects_unparseable_date() {
        let shared = SharedStore::default();
        let mut store = LedgerStore::load(Box::new(shared.clone())).unwrap();
        store
            .record_transaction(Metal::Gold, TransactionKind::Buy, 1.0, 1950.0, "2024-06-01")
            .unwrap();
        let before = store.ledger().clone();

        let result =
            store.record_transaction(Metal::Gold, TransactionKind::Buy, 1.0, 1950.0, "not a date");
        assert!(matches!(
            result,
            Err(LedgerError::Validation { field: "date", .. })
        ));
        let result = store.record_entry(
            Metal::Gold,
            &entry(TransactionKind::Buy, 1.0, 1950.0, "31/31/2024"),
        );
        assert!(matches!(
            result,
            Err(LedgerError::Validation { field: "date", .. })
        ));

        assert_eq!(store.ledger(), &before);
        assert_eq!(persisted(&shared), before);
        assert!(store.account(Metal::Gold).historical_price("31/31/2024").is_none());
    }

    #[test]
    fn test_failed_save_rolls_back_append() {
        let shared = SharedStore::default();
        let mut store = LedgerStore::load(Box::new(shared.clone())).unwrap();
        shared.fail_writes.store(true, Ordering::SeqCst);

        let result = store.record_transaction(
            Metal::Silver,
            TransactionKind::Buy,
            5.0,
            120.0,
            "2024-06-01",
        );
        assert!(matches!(result, Err(LedgerError::Storage(_))));
        assert!(store.account(Metal::Silver).transactions().is_empty());

        let result = store.record_entry(
            Metal::Silver,
            &entry(TransactionKind::Buy, 5.0, 120.0, "2024-01-02"),
        );
        assert!(result.is_err());
        let silver = store.account(Metal::Silver);
        assert!(silver.historical_price("2024-01-02").is_none());
    }

    #[test]
    fn test_record_entry_remembers_looked_up_price() {
        let shared = SharedStore::default();
        let mut store = LedgerStore::load(Box::new(shared.clone())).unwrap();

        store
            .record_entry(
                Metal::Gold,
                &entry(TransactionKind::Buy, 2.0, 3800.0, "2024-01-02"),
            )
            .unwrap();

        let gold = persisted(&shared);
        let gold = gold.account(Metal::Gold);
        assert_eq!(gold.transactions().len(), 1);
        assert_eq!(gold.historical_price("2024-01-02"), Some(1900.0));
    }

    #[test]
    fn test_clear_history_only_touches_one_metal() {
        let shared = SharedStore::default();
        let mut store = LedgerStore::load(Box::new(shared.clone())).unwrap();
        for i in 0..3 {
            store
                .record_transaction(
                    Metal::Gold,
                    TransactionKind::Buy,
                    1.0 + i as f64,
                    2000.0,
                    "2024-06-01",
                )
                .unwrap();
        }
        store
            .record_transaction(Metal::Silver, TransactionKind::Buy, 10.0, 245.0, "2024-06-01")
            .unwrap();

        assert_eq!(store.clear_history(Metal::Gold).unwrap(), 3);
        assert!(store.account(Metal::Gold).transactions().is_empty());
        assert_eq!(store.account(Metal::Silver).transactions().len(), 1);

        let saved = persisted(&shared);
        assert!(saved.account(Metal::Gold).transactions().is_empty());
        assert_eq!(saved.account(Metal::Silver).transactions().len(), 1);
    }

    #[test]
    fn test_clear_history_restores_on_failed_save() {
        let shared = SharedStore::default();
        let mut store = LedgerStore::load(Box::new(shared.clone())).unwrap();
        store
            .record_transaction(Metal::Gold, TransactionKind::Buy, 1.0, 2000.0, "2024-06-01")
            .unwrap();
        shared.fail_writes.store(true, Ordering::SeqCst);

        assert!(store.clear_history(Metal::Gold).is_err());
        assert_eq!(store.account(Metal::Gold).transactions().len(), 1);
    }

    #[test]
    fn test_set_spot_price() {
        let shared = SharedStore::default();
        let mut store = LedgerStore::load(Box::new(shared.clone())).unwrap();

        store.set_spot_price(Metal::Silver, 26.0).unwrap();
        assert_eq!(persisted(&shared).account(Metal::Silver).current_price(), 26.0);
        assert!(store.set_spot_price(Metal::Silver, -1.0).is_err());
        assert_eq!(store.account(Metal::Silver).current_price(), 26.0);
    }
}
