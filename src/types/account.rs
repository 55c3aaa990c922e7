//! Account-related types for the bank server
//!
//! An `Account` carries immutable identity data (number, kind, holders) next to
//! a mutex-guarded `AccountState` holding the balance and the append-only
//! history. Every balance change and history append goes through that mutex.

use super::history::HistoryRecord;
use std::fmt;
use tokio::sync::{Mutex, MutexGuard};

/// Account number, unique across the store
pub type AccountNumber = i64;

/// Signed amount in whole currency units
pub type Amount = i64;

/// The two kinds of ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    /// Ordinary account, balance conventionally non-negative
    Checking,

    /// Debt account, balance conventionally negative and repaid toward zero
    Loan,
}

impl AccountKind {
    /// Wire/display name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Checking => "checking",
            AccountKind::Loan => "loan",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable part of an account, only reachable through the account mutex
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountState {
    /// Current balance
    pub balance: Amount,

    history: Vec<HistoryRecord>,
}

impl AccountState {
    /// Append a record to the history
    pub fn record(&mut self, record: HistoryRecord) {
        self.history.push(record);
    }

    /// Ordered transaction records, oldest first
    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }
}

/// One ledger entry
#[derive(Debug)]
pub struct Account {
    /// Globally unique account number
    pub number: AccountNumber,

    /// Checking or loan
    pub kind: AccountKind,

    /// Identity that created the account
    pub initial_holder: String,

    /// Identities allowed to withdraw, view history and repay (may repeat)
    pub holders: Vec<String>,

    pub(crate) state: Mutex<AccountState>,
}

/// Point-in-time copy of an account, taken under its lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub number: AccountNumber,
    pub kind: AccountKind,
    pub initial_holder: String,
    pub holders: Vec<String>,
    pub balance: Amount,
    pub history: Vec<HistoryRecord>,
}

impl Account {
    /// Create an account with an explicit holder list and an empty history
    pub fn new(
        number: AccountNumber,
        kind: AccountKind,
        initial_holder: impl Into<String>,
        holders: Vec<String>,
        balance: Amount,
    ) -> Self {
        Account {
            number,
            kind,
            initial_holder: initial_holder.into(),
            holders,
            state: Mutex::new(AccountState {
                balance,
                history: Vec::new(),
            }),
        }
    }

    /// Create a checking account whose only holder is its creator
    pub fn checking(number: AccountNumber, holder: &str, balance: Amount) -> Self {
        Account::new(
            number,
            AccountKind::Checking,
            holder,
            vec![holder.to_string()],
            balance,
        )
    }

    /// Whether `user` appears in the holder list
    pub fn is_holder(&self, user: &str) -> bool {
        self.holders.iter().any(|holder| holder == user)
    }

    pub fn is_loan(&self) -> bool {
        self.kind == AccountKind::Loan
    }

    /// Acquire this account's mutex, waiting as long as it takes
    ///
    /// Only the bank's operations hold this guard, so balances and history
    /// change solely through them.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, AccountState> {
        self.state.lock().await
    }

    /// Read the balance under a brief lock
    pub async fn balance(&self) -> Amount {
        self.state.lock().await.balance
    }

    /// Copy the whole account under a brief lock
    pub async fn snapshot(&self) -> AccountSnapshot {
        let state = self.state.lock().await;
        AccountSnapshot {
            number: self.number,
            kind: self.kind,
            initial_holder: self.initial_holder.clone(),
            holders: self.holders.clone(),
            balance: state.balance,
            history: state.history.clone(),
        }
    }
}
