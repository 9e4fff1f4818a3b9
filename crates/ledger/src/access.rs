//! Ownership checks for owner-initiated operations.

use corebank_core::{AccountNumber, DomainError, DomainResult, UserId};

use crate::account::Account;
use crate::store::AccountStore;

/// Fetch the account behind `number` only if `owner` owns it.
///
/// A foreign account and a missing account are indistinguishable to the
/// caller: both come back `NotFound`, so probing cannot reveal which account
/// numbers exist. Must run before any owner-initiated mutation or history
/// read.
pub fn owned_account(
    store: &AccountStore,
    owner: UserId,
    number: &AccountNumber,
) -> DomainResult<Account> {
    let account = store.get(number)?;
    if account.owner_id != owner {
        return Err(DomainError::NotFound);
    }
    Ok(account)
}
