//! Concurrency-safe account storage with per-account exclusive access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use rust_decimal::Decimal;

use corebank_core::{AccountId, AccountNumber, DomainError, DomainResult, UserId};

use crate::account::Account;

/// One lockable account slot. Created once per account, never removed.
#[derive(Debug)]
struct AccountCell {
    inner: Mutex<Account>,
}

/// Account storage keyed by id and by account number.
///
/// Each account sits behind its own mutex, so contention is limited to
/// callers touching the same account. The outer maps are insert-only and
/// guarded by read/write locks; no global lock is ever held across a balance
/// mutation.
#[derive(Debug, Default)]
pub struct AccountStore {
    cells: RwLock<HashMap<AccountId, Arc<AccountCell>>>,
    by_number: RwLock<HashMap<AccountNumber, AccountId>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new ACTIVE zero-balance account for `owner`.
    ///
    /// The generated account number is random over 128 bits and therefore
    /// treated as collision-free.
    pub fn create(&self, owner_id: UserId) -> DomainResult<Account> {
        let account = Account::open(owner_id);

        let mut cells = self.cells.write().map_err(|_| poisoned())?;
        let mut by_number = self.by_number.write().map_err(|_| poisoned())?;
        by_number.insert(account.number, account.id);
        cells.insert(
            account.id,
            Arc::new(AccountCell {
                inner: Mutex::new(account.clone()),
            }),
        );

        Ok(account)
    }

    fn cell(&self, id: AccountId) -> DomainResult<Arc<AccountCell>> {
        let cells = self.cells.read().map_err(|_| poisoned())?;
        cells.get(&id).cloned().ok_or(DomainError::NotFound)
    }

    /// Resolve an externally visible account number to its storage key.
    pub fn resolve(&self, number: &AccountNumber) -> DomainResult<AccountId> {
        let by_number = self.by_number.read().map_err(|_| poisoned())?;
        by_number.get(number).copied().ok_or(DomainError::NotFound)
    }

    /// Snapshot of the account identified by `number`.
    pub fn get(&self, number: &AccountNumber) -> DomainResult<Account> {
        let id = self.resolve(number)?;
        self.get_by_id(id)
    }

    /// Snapshot of the account identified by `id`.
    pub fn get_by_id(&self, id: AccountId) -> DomainResult<Account> {
        let cell = self.cell(id)?;
        let account = cell.inner.lock().map_err(|_| poisoned())?;
        Ok(account.clone())
    }

    /// Apply a signed delta to an account balance, atomically.
    ///
    /// Fails with `InsufficientFunds` when the result would go negative; the
    /// balance is untouched on any error. Concurrent deltas on the same
    /// account serialize on its mutex, so none are lost.
    pub fn mutate(&self, id: AccountId, delta: Decimal) -> DomainResult<Decimal> {
        self.with_account(id, |account| {
            let next = account.balance + delta;
            if next < Decimal::ZERO {
                return Err(DomainError::InsufficientFunds);
            }
            account.balance = next;
            Ok(next)
        })
    }

    /// Run `f` with exclusive access to one account.
    pub fn with_account<R>(
        &self,
        id: AccountId,
        f: impl FnOnce(&mut Account) -> DomainResult<R>,
    ) -> DomainResult<R> {
        let cell = self.cell(id)?;
        let mut guard = cell.inner.lock().map_err(|_| poisoned())?;
        f(&mut guard)
    }

    /// Run `f` with exclusive access to two distinct accounts.
    ///
    /// Locks are always acquired in ascending id order, independent of the
    /// argument order, so two transfers moving money in opposite directions
    /// between the same pair cannot deadlock. `f` still receives the accounts
    /// in the order they were passed.
    pub fn with_pair<R>(
        &self,
        first: AccountId,
        second: AccountId,
        f: impl FnOnce(&mut Account, &mut Account) -> DomainResult<R>,
    ) -> DomainResult<R> {
        if first == second {
            return Err(DomainError::validation(
                "cannot lock an account against itself",
            ));
        }

        let first_cell = self.cell(first)?;
        let second_cell = self.cell(second)?;

        let (lo_cell, hi_cell) = if first < second {
            (&first_cell, &second_cell)
        } else {
            (&second_cell, &first_cell)
        };

        let mut lo = lo_cell.inner.lock().map_err(|_| poisoned())?;
        let mut hi = hi_cell.inner.lock().map_err(|_| poisoned())?;

        if first < second {
            f(&mut lo, &mut hi)
        } else {
            f(&mut hi, &mut lo)
        }
    }

    /// All accounts owned by `owner`, oldest first.
    pub fn list_by_owner(&self, owner_id: UserId) -> DomainResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .list_all()?
            .into_iter()
            .filter(|a| a.owner_id == owner_id)
            .collect();
        accounts.sort_by_key(|a| a.opened_at);
        Ok(accounts)
    }

    /// Snapshot of every account (admin listing).
    pub fn list_all(&self) -> DomainResult<Vec<Account>> {
        let cells = self.cells.read().map_err(|_| poisoned())?;
        let mut accounts = Vec::with_capacity(cells.len());
        for cell in cells.values() {
            let account = cell.inner.lock().map_err(|_| poisoned())?;
            accounts.push(account.clone());
        }
        Ok(accounts)
    }

    pub fn count(&self) -> DomainResult<usize> {
        let cells = self.cells.read().map_err(|_| poisoned())?;
        Ok(cells.len())
    }
}

// A poisoned lock means a panic interrupted a critical section; resuming with
// possibly half-applied state is worse than refusing.
fn poisoned() -> DomainError {
    DomainError::internal("account store lock poisoned")
}
