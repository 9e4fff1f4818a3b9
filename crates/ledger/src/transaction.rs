use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use corebank_core::{AccountId, TransactionId};

/// Kind of money movement a transaction row records.
///
/// No withdrawal operation exists in this core; the variant is kept so
/// history filters and wire formats stay total over the row type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdrawal => "WITHDRAWAL",
            TransactionKind::Transfer => "TRANSFER",
        }
    }
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of a completed money movement.
///
/// Rows are created exactly once by the ledger engine and never updated or
/// deleted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Strictly positive.
    pub amount: Decimal,
    pub kind: TransactionKind,
    /// Absent for deposits: the money enters from outside the ledger.
    pub sender: Option<AccountId>,
    pub receiver: AccountId,
    pub description: String,
    /// Assigned by the log at append time; strictly increasing across rows.
    pub timestamp: DateTime<Utc>,
}

/// A movement the engine has decided on but the log has not yet stamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub sender: Option<AccountId>,
    pub receiver: AccountId,
    pub description: String,
}

/// Which slice of an account's history a query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryScope {
    /// Every row touching the account, either side.
    All,
    /// DEPOSIT rows credited to the account.
    DepositsOnly,
    /// TRANSFER rows the account sent.
    Sent,
    /// TRANSFER rows the account received.
    Received,
}
