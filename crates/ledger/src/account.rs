use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use corebank_core::{AccountId, AccountNumber, DEFAULT_CURRENCY, UserId};

/// Lifecycle status of an account.
///
/// Only ACTIVE accounts may be debited or credited. CLOSED is terminal;
/// accounts are never physically removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    Active,
    Frozen,
    Closed,
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Frozen => "FROZEN",
            AccountStatus::Closed => "CLOSED",
        };
        f.write_str(s)
    }
}

/// A customer account: balance plus ownership and lifecycle metadata.
///
/// # Invariants
/// - `balance >= 0` at all times (no overdraft).
/// - `number` and `currency` are immutable after creation.
/// - Exactly one owner; an owner may hold many accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub number: AccountNumber,
    pub balance: Decimal,
    pub currency: String,
    pub status: AccountStatus,
    pub owner_id: UserId,
    pub opened_at: DateTime<Utc>,
}

impl Account {
    /// Fresh zero-balance ACTIVE account for `owner`.
    pub(crate) fn open(owner_id: UserId) -> Self {
        Self {
            id: AccountId::new(),
            number: AccountNumber::generate(),
            balance: Decimal::ZERO,
            currency: DEFAULT_CURRENCY.to_string(),
            status: AccountStatus::Active,
            owner_id,
            opened_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}
