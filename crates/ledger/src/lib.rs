//! `corebank-ledger` — the ledger consistency engine.
//!
//! Account balances and the transaction log always agree: every deposit or
//! transfer either fully commits (balance change plus log row) or leaves no
//! trace. Contention is per-account; unrelated accounts never block each
//! other.

pub mod access;
pub mod account;
pub mod engine;
pub mod log;
pub mod stats;
pub mod store;
pub mod transaction;

pub use access::owned_account;
pub use account::{Account, AccountStatus};
pub use engine::LedgerEngine;
pub use log::TransactionLog;
pub use stats::{DailyBucket, MonthlyBucket, daily_volume, monthly_volume};
pub use store::AccountStore;
pub use transaction::{HistoryScope, Transaction, TransactionDraft, TransactionKind};
