//! Named request/response shapes for every operation, plus mapping helpers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use corebank_auth::{Role, User};
use corebank_core::{AccountId, AccountNumber, TransactionId, UserId};
use corebank_fraud::{FraudVerdict, TransactionSummary};
use corebank_ledger::{Account, AccountStatus, AccountStore, Transaction, TransactionKind};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Account numbers arrive as raw strings so a malformed value becomes a
    /// field error instead of a body-rejection.
    pub sender_account_number: String,
    pub receiver_account_number: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DailyStatsParams {
    /// Lookback window in days; defaults to 30.
    pub days: Option<i64>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: AccountId,
    pub number: AccountNumber,
    pub balance: Decimal,
    pub currency: String,
    pub status: AccountStatus,
    pub owner_id: UserId,
    pub opened_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            number: account.number,
            balance: account.balance,
            currency: account.currency,
            status: account.status,
            owner_id: account.owner_id,
            opened_at: account.opened_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: TransactionId,
    /// Sender's account number; absent for deposits.
    pub sender_account: Option<String>,
    pub receiver_account: String,
    pub amount: Decimal,
    pub description: String,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
}

/// Admin view of a transaction with its fraud annotation. The sender slot
/// uses the `SYS_BANK` sentinel for deposits, matching the reporting
/// dashboards.
#[derive(Debug, Serialize)]
pub struct AdminTransactionResponse {
    pub id: TransactionId,
    pub sender_account: String,
    pub receiver_account: String,
    pub amount: Decimal,
    pub description: String,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
    pub fraud: FraudVerdict,
}

#[derive(Debug, Serialize)]
pub struct SystemStatsResponse {
    pub user_count: u64,
    pub account_count: u64,
    pub transaction_count: u64,
    pub total_amount: Decimal,
}

// -------------------------
// Mapping helpers
// -------------------------

/// Sentinel shown where a deposit has no sending account.
pub const SYS_BANK: &str = "SYS_BANK";

fn number_for(store: &AccountStore, id: AccountId) -> Option<String> {
    store.get_by_id(id).ok().map(|a| a.number.to_string())
}

pub fn transaction_to_response(store: &AccountStore, t: &Transaction) -> TransactionResponse {
    TransactionResponse {
        id: t.id,
        sender_account: t.sender.and_then(|id| number_for(store, id)),
        receiver_account: number_for(store, t.receiver).unwrap_or_default(),
        amount: t.amount,
        description: t.description.clone(),
        kind: t.kind,
        timestamp: t.timestamp,
    }
}

pub fn admin_transaction_to_response(
    store: &AccountStore,
    t: &Transaction,
    fraud: FraudVerdict,
) -> AdminTransactionResponse {
    AdminTransactionResponse {
        id: t.id,
        sender_account: t
            .sender
            .and_then(|id| number_for(store, id))
            .unwrap_or_else(|| SYS_BANK.to_string()),
        receiver_account: number_for(store, t.receiver).unwrap_or_default(),
        amount: t.amount,
        description: t.description.clone(),
        kind: t.kind,
        timestamp: t.timestamp,
        fraud,
    }
}

/// Shape a committed row the way the fraud scorer wants it.
pub fn transaction_summary(t: &Transaction) -> TransactionSummary {
    TransactionSummary {
        amount: t.amount.to_f64().unwrap_or(0.0),
        timestamp: t.timestamp.to_rfc3339(),
        kind: t.kind.as_str().to_string(),
        receiver_account: t.receiver.to_string(),
        sender_account: t.sender.map(|id| id.to_string()),
    }
}
