//! Concurrent account store
//!
//! This module provides the `LedgerStore`, the single owner of every account in
//! the server, and `lock_pair`, the only way two account mutexes are ever held
//! at the same time.
//!
//! # Design
//!
//! Accounts live in a `DashMap` keyed by account number, so lookups and
//! iteration are safe while other tasks append. Each account is wrapped in an
//! `Arc` and carries its own `tokio::sync::Mutex`; the map itself never guards
//! balances.
//!
//! ```text
//! LedgerStore
//!     ├── DashMap<AccountNumber, Arc<Account>>   (lookup by number)
//!     ├── DashMap<String, Vec<AccountNumber>>    (initial holder index, creation order)
//!     └── Mutex<()>                              (serializes appends)
//! ```
//!
//! # Lock Ordering
//!
//! Two-account operations lock the lower account number first. Because every
//! caller follows the same global order, no cycle of waiters can form. The
//! append guard is a plain `std::sync::Mutex` held only inside synchronous
//! code, so it is never held across an `.await` or together with an account
//! mutex.

use crate::types::{Account, AccountKind, AccountNumber, AccountState, LedgerError};
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::MutexGuard;
use tracing::debug;

/// Concurrent collection of every account in the ledger
#[derive(Debug, Default)]
pub struct LedgerStore {
    /// Accounts indexed by number
    accounts: DashMap<AccountNumber, Arc<Account>>,

    /// Account numbers per initial holder, in creation order
    owners: DashMap<String, Vec<AccountNumber>>,

    /// Makes check-then-insert in `append_account` atomic
    append_guard: Mutex<()>,
}

impl LedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `accounts`
    ///
    /// Unlike `append_account`, one identity may be the initial holder of
    /// several accounts here (seed data gives every person a checking and a
    /// loan account). Account numbers must still be unique.
    ///
    /// # Errors
    ///
    /// `AccountNumberInUse` if two accounts share a number.
    pub fn with_accounts(
        accounts: impl IntoIterator<Item = Account>,
    ) -> Result<Self, LedgerError> {
        let store = Self::new();
        for account in accounts {
            if let Some(owner) = store.initial_holder_of(account.number) {
                return Err(LedgerError::AccountNumberInUse {
                    number: account.number,
                    owner,
                });
            }
            store.insert(account);
        }
        Ok(store)
    }

    /// Add a newly created account
    ///
    /// The owner check and the number check happen under the append guard,
    /// so two concurrent appends can never both pass them.
    ///
    /// # Errors
    ///
    /// * `OwnerAlreadyExists` - the identity already created an account
    /// * `AccountNumberInUse` - the number is taken
    pub fn append_account(&self, account: Account) -> Result<Arc<Account>, LedgerError> {
        let _guard = self
            .append_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.owners.contains_key(&account.initial_holder) {
            return Err(LedgerError::OwnerAlreadyExists {
                user: account.initial_holder,
            });
        }
        if let Some(owner) = self.initial_holder_of(account.number) {
            return Err(LedgerError::AccountNumberInUse {
                number: account.number,
                owner,
            });
        }

        Ok(self.insert(account))
    }

    /// Look an account up by number
    pub fn find_account(&self, number: AccountNumber) -> Option<Arc<Account>> {
        self.accounts.get(&number).map(|entry| Arc::clone(entry.value()))
    }

    /// First account (in creation order) whose initial holder is `identity`
    pub fn find_by_initial_holder(&self, identity: &str) -> Option<Arc<Account>> {
        let first = self
            .owners
            .get(identity)
            .and_then(|numbers| numbers.first().copied())?;
        self.find_account(first)
    }

    /// First checking account (in creation order) whose initial holder is `identity`
    pub fn find_checking_by_initial_holder(&self, identity: &str) -> Option<Arc<Account>> {
        let numbers = self.owners.get(identity).map(|numbers| numbers.value().clone())?;
        numbers
            .into_iter()
            .filter_map(|number| self.find_account(number))
            .find(|account| account.kind == AccountKind::Checking)
    }

    /// Snapshot of every account, sorted by account number
    pub fn accounts(&self) -> Vec<Arc<Account>> {
        let mut accounts: Vec<Arc<Account>> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        accounts.sort_by_key(|account| account.number);
        accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn initial_holder_of(&self, number: AccountNumber) -> Option<String> {
        self.accounts
            .get(&number)
            .map(|entry| entry.initial_holder.clone())
    }

    fn insert(&self, account: Account) -> Arc<Account> {
        let account = Arc::new(account);
        self.accounts.insert(account.number, Arc::clone(&account));
        self.owners
            .entry(account.initial_holder.clone())
            .or_default()
            .push(account.number);
        account
    }
}

/// Both account mutexes of a two-account operation
///
/// Dropping the guard releases both locks, on every exit path.
pub(crate) struct PairGuard<'a> {
    low_number: AccountNumber,
    high_number: AccountNumber,
    low: MutexGuard<'a, AccountState>,
    high: MutexGuard<'a, AccountState>,
}

impl<'a> PairGuard<'a> {
    /// Account numbers in the order they were locked
    pub fn order(&self) -> (AccountNumber, AccountNumber) {
        (self.low_number, self.high_number)
    }

    /// Mutable states as `(source, other)`
    pub fn states(&mut self, source: AccountNumber) -> (&mut AccountState, &mut AccountState) {
        if source == self.low_number {
            (&mut *self.low, &mut *self.high)
        } else {
            (&mut *self.high, &mut *self.low)
        }
    }
}

impl Drop for PairGuard<'_> {
    fn drop(&mut self) {
        let (first, second) = self.order();
        debug!(first, second, "releasing account pair");
    }
}

/// Lock two distinct accounts in ascending account-number order
///
/// # Errors
///
/// `SameAccount` if both arguments are the same account. Locking it twice
/// would wait on itself forever.
pub(crate) async fn lock_pair<'a>(
    a: &'a Account,
    b: &'a Account,
) -> Result<PairGuard<'a>, LedgerError> {
    if a.number == b.number {
        return Err(LedgerError::SameAccount { number: a.number });
    }
    let (first, second) = if a.number < b.number { (a, b) } else { (b, a) };

    let low = first.lock().await;
    debug!(account = first.number, "locked first account of pair");
    let high = second.lock().await;
    debug!(account = second.number, "locked second account of pair");

    Ok(PairGuard {
        low_number: first.number,
        high_number: second.number,
        low,
        high,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn store() -> LedgerStore {
        LedgerStore::with_accounts(vec![
            Account::checking(1001, "Alice", 2100),
            Account::new(1002, AccountKind::Loan, "Alice", vec!["Alice".into()], -300),
            Account::checking(1003, "Bob", 3500),
        ])
        .unwrap()
    }

    #[test]
    fn test_with_accounts_rejects_duplicate_numbers() {
        let result = LedgerStore::with_accounts(vec![
            Account::checking(1001, "Alice", 0),
            Account::checking(1001, "Bob", 0),
        ]);

        assert_eq!(
            result.unwrap_err(),
            LedgerError::AccountNumberInUse {
                number: 1001,
                owner: "Alice".to_string()
            }
        );
    }

    #[test]
    fn test_lookups() {
        let store = store();

        assert_eq!(store.len(), 3);
        assert_eq!(store.find_account(1003).unwrap().initial_holder, "Bob");
        assert!(store.find_account(9999).is_none());
        assert_eq!(store.find_by_initial_holder("Alice").unwrap().number, 1001);
        assert!(store.find_by_initial_holder("Zed").is_none());
    }

    #[test]
    fn test_find_checking_skips_loan_accounts() {
        let store = LedgerStore::with_accounts(vec![
            Account::new(2002, AccountKind::Loan, "Eve", vec!["Eve".into()], -10),
            Account::checking(2001, "Eve", 10),
        ])
        .unwrap();

        assert_eq!(store.find_by_initial_holder("Eve").unwrap().number, 2002);
        assert_eq!(store.find_checking_by_initial_holder("Eve").unwrap().number, 2001);
        assert!(store.find_checking_by_initial_holder("Nobody").is_none());
    }

    #[test]
    fn test_accounts_sorted_by_number() {
        let store = LedgerStore::with_accounts(vec![
            Account::checking(3, "C", 0),
            Account::checking(1, "A", 0),
            Account::checking(2, "B", 0),
        ])
        .unwrap();

        let numbers: Vec<AccountNumber> = store.accounts().iter().map(|a| a.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[rstest]
    #[case::owner_exists(
        Account::checking(2000, "Alice", 0),
        LedgerError::OwnerAlreadyExists { user: "Alice".to_string() }
    )]
    #[case::number_in_use(
        Account::checking(1003, "Zed", 0),
        LedgerError::AccountNumberInUse { number: 1003, owner: "Bob".to_string() }
    )]
    fn test_append_rejections(#[case] account: Account, #[case] expected: LedgerError) {
        let store = store();

        assert_eq!(store.append_account(account).unwrap_err(), expected);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_append_makes_account_findable() {
        let store = store();
        store.append_account(Account::checking(2001, "Zoe", 50)).unwrap();

        assert_eq!(store.find_account(2001).unwrap().initial_holder, "Zoe");
        assert_eq!(store.find_by_initial_holder("Zoe").unwrap().number, 2001);
    }

    #[rstest]
    #[case::ascending(1001, 1003)]
    #[case::descending(1003, 1001)]
    #[tokio::test]
    async fn test_lock_pair_orders_by_number(#[case] a: AccountNumber, #[case] b: AccountNumber) {
        let store = store();
        let (a, b) = (store.find_account(a).unwrap(), store.find_account(b).unwrap());
        let (a_before, b_before) = (a.balance().await, b.balance().await);

        let mut guard = lock_pair(&a, &b).await.unwrap();
        assert_eq!(guard.order(), (1001, 1003));

        let (source, other) = guard.states(a.number);
        source.balance -= 100;
        other.balance += 100;
        drop(guard);

        assert_eq!(a.balance().await, a_before - 100);
        assert_eq!(b.balance().await, b_before + 100);
    }

    #[tokio::test]
    async fn test_lock_pair_waits_on_low_account_first() {
        let store = store();
        let low = store.find_account(1001).unwrap();
        let high = store.find_account(1003).unwrap();

        let held = low.lock().await;
        let pending = {
            let (low, high) = (Arc::clone(&low), Arc::clone(&high));
            tokio::spawn(async move {
                let _pair = lock_pair(&high, &low).await.unwrap();
            })
        };
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        // Blocked on 1001, so 1003 must still be free
        assert!(high.state.try_lock().is_ok());

        drop(held);
        pending.await.unwrap();
    }

    #[tokio::test]
    async fn test_lock_pair_rejects_same_account() {
        let store = store();
        let account = store.find_account(1001).unwrap();

        let result = lock_pair(&account, &account).await;
        assert!(matches!(result, Err(LedgerError::SameAccount { number: 1001 })));
    }
}
