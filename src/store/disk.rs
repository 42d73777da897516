use crate::core::store::BlobStore;
use anyhow::{Context, Result};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "ledger";

/// Blob store backed by a fjall keyspace on disk.
///
/// Each put is a single-key insert followed by a journal sync, so a
/// snapshot is either fully written or not visible at all.
pub struct DiskStore {
    partition: PartitionHandle,
    keyspace: Keyspace,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open ledger store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open ledger partition")?;
        debug!("Opened ledger store at {}", path.display());

        Ok(Self {
            partition,
            keyspace,
        })
    }
}

impl BlobStore for DiskStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .partition
            .get(key)
            .with_context(|| format!("Failed to read key: {key}"))?;
        match &value {
            Some(_) => debug!("Store HIT for key: {}", key),
            None => debug!("Store MISS for key: {}", key),
        }
        Ok(value.map(|slice| slice.to_vec()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.partition
            .insert(key, value)
            .with_context(|| format!("Failed to write key: {key}"))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to sync ledger store")?;
        debug!("Store PUT for key: {}", key);
        Ok(())
    }
}
