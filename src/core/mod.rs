//! Ledger domain logic: data model, persistence, aggregation and trade entry.

pub mod analytics;
pub mod builder;
pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod history;
pub mod ledger;
pub mod log;
pub mod price;
pub mod store;

// Re-export main types for cleaner imports
pub use currency::DisplayConverter;
pub use error::LedgerError;
pub use history::Period;
pub use ledger::{Ledger, Metal, MetalAccount, Transaction, TransactionKind};
pub use price::HistoricalPriceSource;
pub use store::{BlobStore, LedgerStore};
