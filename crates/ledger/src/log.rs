//! Append-only record of completed money movements.

use std::sync::RwLock;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use corebank_core::{AccountId, DomainError, DomainResult, TransactionId};

use crate::transaction::{HistoryScope, Transaction, TransactionDraft, TransactionKind};

/// Append-only transaction log.
///
/// Rows are immutable once written; there is no update or delete path.
/// Timestamps are assigned here and are strictly increasing across rows, so
/// newest-first ordering is total and stable.
#[derive(Debug, Default)]
pub struct TransactionLog {
    rows: RwLock<Vec<Transaction>>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp and append a draft. The returned row is the committed record.
    ///
    /// If the wall clock has not advanced past the previous row (or stepped
    /// backwards), the new timestamp is nudged one microsecond past it.
    pub fn append(&self, draft: TransactionDraft) -> DomainResult<Transaction> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;

        let now = Utc::now();
        let timestamp = match rows.last() {
            Some(last) if last.timestamp >= now => last.timestamp + Duration::microseconds(1),
            _ => now,
        };

        let row = Transaction {
            id: TransactionId::new(),
            amount: draft.amount,
            kind: draft.kind,
            sender: draft.sender,
            receiver: draft.receiver,
            description: draft.description,
            timestamp,
        };
        rows.push(row.clone());
        Ok(row)
    }

    /// Snapshot of rows touching `account` within `scope`, newest first.
    ///
    /// The snapshot is owned: it can be iterated any number of times without
    /// holding the log's lock.
    pub fn query(&self, account: AccountId, scope: HistoryScope) -> DomainResult<Vec<Transaction>> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        let mut matched: Vec<Transaction> = rows
            .iter()
            .filter(|t| Self::matches(t, account, scope))
            .cloned()
            .collect();
        // rows are stored in append (timestamp) order
        matched.reverse();
        Ok(matched)
    }

    fn matches(t: &Transaction, account: AccountId, scope: HistoryScope) -> bool {
        match scope {
            HistoryScope::All => t.receiver == account || t.sender == Some(account),
            HistoryScope::DepositsOnly => {
                t.kind == TransactionKind::Deposit && t.receiver == account
            }
            HistoryScope::Sent => t.kind == TransactionKind::Transfer && t.sender == Some(account),
            HistoryScope::Received => {
                t.kind == TransactionKind::Transfer && t.receiver == account
            }
        }
    }

    /// Every row, newest first (admin listing).
    pub fn list_all(&self) -> DomainResult<Vec<Transaction>> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        let mut all: Vec<Transaction> = rows.clone();
        all.reverse();
        Ok(all)
    }

    /// Every row in append order (aggregation input).
    pub(crate) fn snapshot(&self) -> DomainResult<Vec<Transaction>> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.clone())
    }

    pub fn count(&self) -> DomainResult<usize> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.len())
    }

    /// Sum over every row's amount, deposits and transfers alike.
    pub fn total_amount(&self) -> DomainResult<Decimal> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.iter().map(|t| t.amount).sum())
    }
}

fn poisoned() -> DomainError {
    DomainError::internal("transaction log lock poisoned")
}
