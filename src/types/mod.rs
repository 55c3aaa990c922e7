//! Types module
//!
//! Contains core data structures used throughout the server.
//! This module organizes types into logical submodules:
//! - `account`: accounts, their locked state and snapshots
//! - `history`: immutable transaction history records and filtering
//! - `request`: client commands and request decoding
//! - `outcome`: structured results returned to clients
//! - `error`: error types for the ledger

pub mod account;
pub mod error;
pub mod history;
pub mod outcome;
pub mod request;

pub use account::{Account, AccountKind, AccountNumber, AccountSnapshot, AccountState, Amount};
pub use error::LedgerError;
pub use history::{filter_history, HistoryRecord, Operation, SYSTEM_ACTOR};
pub use outcome::{Outcome, OutcomeKind};
pub use request::{Command, Request};
