//! Deposits and transfers as atomic units against the store and the log.

use std::sync::Arc;

use rust_decimal::Decimal;

use corebank_core::{AccountNumber, DomainError, DomainResult, UserId};

use crate::access;
use crate::account::Account;
use crate::log::TransactionLog;
use crate::store::AccountStore;
use crate::transaction::{HistoryScope, Transaction, TransactionDraft, TransactionKind};

/// Orchestrates money movement so balances and the log always agree.
///
/// Every operation either fully commits (balance change plus log row) or
/// leaves no trace. A transfer holds both account locks for the whole unit of
/// work; lock order is ascending account id (see [`AccountStore::with_pair`]),
/// so opposing transfers on the same pair cannot deadlock.
#[derive(Clone)]
pub struct LedgerEngine {
    store: Arc<AccountStore>,
    log: Arc<TransactionLog>,
}

impl LedgerEngine {
    pub fn new(store: Arc<AccountStore>, log: Arc<TransactionLog>) -> Self {
        Self { store, log }
    }

    /// Open a fresh account for `owner`.
    pub fn open_account(&self, owner: UserId) -> DomainResult<Account> {
        self.store.create(owner)
    }

    /// Ownership-checked account view.
    pub fn account_for_owner(
        &self,
        owner: UserId,
        number: &AccountNumber,
    ) -> DomainResult<Account> {
        access::owned_account(&self.store, owner, number)
    }

    /// Credit `amount` into the account and record a DEPOSIT row.
    ///
    /// The credit and the row commit together: the row is appended while the
    /// account lock is held, and a failed append takes the credit back out.
    pub fn deposit(
        &self,
        number: &AccountNumber,
        amount: Decimal,
        description: impl Into<String>,
    ) -> DomainResult<Transaction> {
        ensure_positive(amount)?;
        let id = self.store.resolve(number)?;
        let description = description.into();

        self.store.with_account(id, |account| {
            ensure_active(account)?;
            account.balance += amount;
            match self.log.append(TransactionDraft {
                amount,
                kind: TransactionKind::Deposit,
                sender: None,
                receiver: account.id,
                description,
            }) {
                Ok(row) => Ok(row),
                Err(err) => {
                    // no row was written; take the credit back out
                    account.balance -= amount;
                    Err(err)
                }
            }
        })
    }

    /// Move `amount` from sender to receiver and record one TRANSFER row.
    ///
    /// Both balances and the row commit as one unit; on any failure neither
    /// account changes and no row exists. The caller is responsible for
    /// having authorized the sender's owner (see [`access::owned_account`]).
    pub fn transfer(
        &self,
        sender_number: &AccountNumber,
        receiver_number: &AccountNumber,
        amount: Decimal,
        description: impl Into<String>,
    ) -> DomainResult<Transaction> {
        ensure_positive(amount)?;

        let sender_id = self.store.resolve(sender_number)?;
        let receiver_id = self.store.resolve(receiver_number)?;
        if sender_id == receiver_id {
            return Err(DomainError::validation("sender and receiver must differ"));
        }
        let description = description.into();

        self.store.with_pair(sender_id, receiver_id, |sender, receiver| {
            ensure_active(sender)?;
            ensure_active(receiver)?;
            if sender.balance < amount {
                return Err(DomainError::InsufficientFunds);
            }

            sender.balance -= amount;
            receiver.balance += amount;
            match self.log.append(TransactionDraft {
                amount,
                kind: TransactionKind::Transfer,
                sender: Some(sender.id),
                receiver: receiver.id,
                description,
            }) {
                Ok(row) => Ok(row),
                Err(err) => {
                    sender.balance += amount;
                    receiver.balance -= amount;
                    Err(err)
                }
            }
        })
    }

    /// Account history scoped to its owner, newest first.
    pub fn history(
        &self,
        owner: UserId,
        number: &AccountNumber,
        scope: HistoryScope,
    ) -> DomainResult<Vec<Transaction>> {
        let account = access::owned_account(&self.store, owner, number)?;
        self.log.query(account.id, scope)
    }
}

fn ensure_positive(amount: Decimal) -> DomainResult<()> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::validation("amount must be positive"));
    }
    Ok(())
}

fn ensure_active(account: &Account) -> DomainResult<()> {
    if !account.is_active() {
        return Err(DomainError::conflict(format!(
            "account is {}",
            account.status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountStatus;
    use proptest::prelude::*;

    struct Fixture {
        engine: LedgerEngine,
        store: Arc<AccountStore>,
        log: Arc<TransactionLog>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(AccountStore::new());
        let log = Arc::new(TransactionLog::new());
        let engine = LedgerEngine::new(store.clone(), log.clone());
        Fixture { engine, store, log }
    }

    fn funded_account(fx: &Fixture, owner: UserId, cents: i64) -> Account {
        let account = fx.engine.open_account(owner).unwrap();
        if cents > 0 {
            fx.engine
                .deposit(&account.number, Decimal::new(cents, 2), "seed")
                .unwrap();
        }
        fx.store.get_by_id(account.id).unwrap()
    }

    fn balance(fx: &Fixture, account: &Account) -> Decimal {
        fx.store.get_by_id(account.id).unwrap().balance
    }

    #[test]
    fn deposit_is_additive_and_logged_once() {
        let fx = fixture();
        let account = fx.engine.open_account(UserId::new()).unwrap();

        let row = fx
            .engine
            .deposit(&account.number, Decimal::new(10_000, 2), "payday")
            .unwrap();

        assert_eq!(row.kind, TransactionKind::Deposit);
        assert_eq!(row.sender, None);
        assert_eq!(row.receiver, account.id);
        assert_eq!(row.amount, Decimal::new(10_000, 2));
        assert_eq!(balance(&fx, &account), Decimal::new(10_000, 2));
        assert_eq!(fx.log.count().unwrap(), 1);
    }

    #[test]
    fn deposit_rejects_non_positive_amounts() {
        let fx = fixture();
        let account = fx.engine.open_account(UserId::new()).unwrap();

        for bad in [Decimal::ZERO, Decimal::new(-100, 2)] {
            let err = fx.engine.deposit(&account.number, bad, "").unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
        assert_eq!(fx.log.count().unwrap(), 0);
    }

    #[test]
    fn deposit_to_unknown_account_is_not_found() {
        let fx = fixture();
        let err = fx
            .engine
            .deposit(&AccountNumber::generate(), Decimal::ONE, "")
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn transfer_conserves_money() {
        let fx = fixture();
        let owner = UserId::new();
        let a = funded_account(&fx, owner, 10_000);
        let b = funded_account(&fx, UserId::new(), 0);

        let row = fx
            .engine
            .transfer(&a.number, &b.number, Decimal::new(4_000, 2), "rent")
            .unwrap();

        assert_eq!(row.kind, TransactionKind::Transfer);
        assert_eq!(row.amount, Decimal::new(4_000, 2));
        assert_eq!(balance(&fx, &a), Decimal::new(6_000, 2));
        assert_eq!(balance(&fx, &b), Decimal::new(4_000, 2));
    }

    #[test]
    fn insufficient_funds_leaves_no_trace() {
        let fx = fixture();
        let a = funded_account(&fx, UserId::new(), 6_000);
        let b = funded_account(&fx, UserId::new(), 4_000);
        let rows_before = fx.log.count().unwrap();

        let err = fx
            .engine
            .transfer(&a.number, &b.number, Decimal::new(10_000, 2), "rent2")
            .unwrap_err();

        assert_eq!(err, DomainError::InsufficientFunds);
        assert_eq!(balance(&fx, &a), Decimal::new(6_000, 2));
        assert_eq!(balance(&fx, &b), Decimal::new(4_000, 2));
        assert_eq!(fx.log.count().unwrap(), rows_before);
    }

    #[test]
    fn transfer_reports_each_missing_side() {
        let fx = fixture();
        let a = funded_account(&fx, UserId::new(), 1_000);
        let ghost = AccountNumber::generate();

        assert_eq!(
            fx.engine
                .transfer(&ghost, &a.number, Decimal::ONE, "")
                .unwrap_err(),
            DomainError::NotFound
        );
        assert_eq!(
            fx.engine
                .transfer(&a.number, &ghost, Decimal::ONE, "")
                .unwrap_err(),
            DomainError::NotFound
        );
        assert_eq!(balance(&fx, &a), Decimal::new(1_000, 2));
    }

    #[test]
    fn transfer_to_self_is_rejected() {
        let fx = fixture();
        let a = funded_account(&fx, UserId::new(), 1_000);

        let err = fx
            .engine
            .transfer(&a.number, &a.number, Decimal::ONE, "")
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(balance(&fx, &a), Decimal::new(1_000, 2));
    }

    #[test]
    fn frozen_accounts_take_part_in_nothing() {
        let fx = fixture();
        let a = funded_account(&fx, UserId::new(), 10_000);
        let b = funded_account(&fx, UserId::new(), 0);

        fx.store
            .with_account(b.id, |acc| {
                acc.status = AccountStatus::Frozen;
                Ok(())
            })
            .unwrap();

        // frozen receiver
        let err = fx
            .engine
            .transfer(&a.number, &b.number, Decimal::ONE, "")
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // frozen sender
        let err = fx
            .engine
            .transfer(&b.number, &a.number, Decimal::ONE, "")
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // frozen deposit target
        let err = fx.engine.deposit(&b.number, Decimal::ONE, "").unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        assert_eq!(balance(&fx, &a), Decimal::new(10_000, 2));
        assert_eq!(balance(&fx, &b), Decimal::ZERO);
    }

    #[test]
    fn example_scenario_from_the_product_brief() {
        // A starts at 100.00, B at 0.00; 40.00 moves, then 100.00 bounces.
        let fx = fixture();
        let a = funded_account(&fx, UserId::new(), 10_000);
        let b = funded_account(&fx, UserId::new(), 0);

        let row = fx
            .engine
            .transfer(&a.number, &b.number, Decimal::new(4_000, 2), "rent")
            .unwrap();
        assert_eq!(row.amount, Decimal::new(4_000, 2));
        assert_eq!(row.kind, TransactionKind::Transfer);

        let err = fx
            .engine
            .transfer(&a.number, &b.number, Decimal::new(10_000, 2), "rent2")
            .unwrap_err();
        assert_eq!(err, DomainError::InsufficientFunds);

        assert_eq!(balance(&fx, &a), Decimal::new(6_000, 2));
        assert_eq!(balance(&fx, &b), Decimal::new(4_000, 2));
    }

    #[test]
    fn history_is_owner_scoped_and_newest_first() {
        let fx = fixture();
        let alice = UserId::new();
        let a = funded_account(&fx, alice, 10_000);
        let b = funded_account(&fx, UserId::new(), 0);

        fx.engine
            .transfer(&a.number, &b.number, Decimal::new(1_000, 2), "one")
            .unwrap();
        fx.engine
            .transfer(&a.number, &b.number, Decimal::new(2_000, 2), "two")
            .unwrap();

        let rows = fx.engine.history(alice, &a.number, HistoryScope::All).unwrap();
        assert_eq!(rows.len(), 3); // seed deposit + two transfers
        assert!(rows.windows(2).all(|w| w[0].timestamp > w[1].timestamp));

        let sent = fx.engine.history(alice, &a.number, HistoryScope::Sent).unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].description, "two");

        let deposits = fx
            .engine
            .history(alice, &a.number, HistoryScope::DepositsOnly)
            .unwrap();
        assert_eq!(deposits.len(), 1);

        // someone else asking for Alice's history sees "not found"
        let err = fx
            .engine
            .history(UserId::new(), &a.number, HistoryScope::All)
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn concurrent_transfers_lose_no_updates() {
        use std::thread;

        let fx = fixture();
        let a = funded_account(&fx, UserId::new(), 80_000);
        let b = funded_account(&fx, UserId::new(), 0);

        // 8 threads x 10 transfers x 10.00 each = exactly the funded 800.00
        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = fx.engine.clone();
            let (from, to) = (a.number, b.number);
            handles.push(thread::spawn(move || {
                for _ in 0..10 {
                    engine
                        .transfer(&from, &to, Decimal::new(1_000, 2), "spread")
                        .unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(balance(&fx, &a), Decimal::ZERO);
        assert_eq!(balance(&fx, &b), Decimal::new(80_000, 2));
        assert_eq!(fx.log.query(b.id, HistoryScope::Received).unwrap().len(), 80);
    }

    #[test]
    fn opposing_transfers_do_not_deadlock() {
        use std::thread;

        let fx = fixture();
        let a = funded_account(&fx, UserId::new(), 50_000);
        let b = funded_account(&fx, UserId::new(), 50_000);

        let mut handles = Vec::new();
        for direction in 0..2 {
            let engine = fx.engine.clone();
            let (from, to) = if direction == 0 {
                (a.number, b.number)
            } else {
                (b.number, a.number)
            };
            handles.push(thread::spawn(move || {
                for _ in 0..200 {
                    engine
                        .transfer(&from, &to, Decimal::new(100, 2), "ping")
                        .unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        // equal traffic both ways: balances end where they started
        assert_eq!(balance(&fx, &a), Decimal::new(50_000, 2));
        assert_eq!(balance(&fx, &b), Decimal::new(50_000, 2));
        assert_eq!(fx.log.count().unwrap(), 402); // 2 seeds + 400 transfers
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: any sequence of attempted transfers between three
        /// accounts conserves total money, whether the attempts succeed or
        /// bounce.
        #[test]
        fn transfers_conserve_total_money(
            moves in prop::collection::vec((0usize..3, 0usize..3, 1i64..50_000i64), 1..40)
        ) {
            let fx = fixture();
            let owner = UserId::new();
            let accounts = [
                funded_account(&fx, owner, 30_000),
                funded_account(&fx, owner, 20_000),
                funded_account(&fx, owner, 0),
            ];
            let total_before: Decimal = accounts
                .iter()
                .map(|a| balance(&fx, a))
                .sum();

            for (from, to, cents) in moves {
                let result = fx.engine.transfer(
                    &accounts[from].number,
                    &accounts[to].number,
                    Decimal::new(cents, 2),
                    "shuffle",
                );
                if from == to {
                    prop_assert!(result.is_err());
                }
            }

            let total_after: Decimal = accounts
                .iter()
                .map(|a| balance(&fx, a))
                .sum();
            prop_assert_eq!(total_before, total_after);

            for a in &accounts {
                prop_assert!(balance(&fx, a) >= Decimal::ZERO);
            }
        }

        /// Property: deposits are the only way total money grows, and each
        /// one grows it by exactly its amount.
        #[test]
        fn deposits_grow_total_by_exactly_their_amount(
            amounts in prop::collection::vec(1i64..100_000i64, 1..20)
        ) {
            let fx = fixture();
            let account = fx.engine.open_account(UserId::new()).unwrap();

            let mut expected = Decimal::ZERO;
            for cents in amounts {
                let amount = Decimal::new(cents, 2);
                fx.engine.deposit(&account.number, amount, "drip").unwrap();
                expected += amount;
            }

            prop_assert_eq!(balance(&fx, &account), expected);
            prop_assert_eq!(fx.log.total_amount().unwrap(), expected);
        }
    }
}
