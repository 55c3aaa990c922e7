//! Rust Bank Server Library
//! # Overview
//!
//! This library provides a concurrent in-memory bank ledger served over TCP.
//! Many clients operate on shared accounts at once; every balance change runs
//! under that account's mutex, and two-account operations lock in ascending
//! account-number order so they can never deadlock.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, HistoryRecord, Request, Outcome, etc.)
//! - [`config`] - JSON configuration
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::store`] - Concurrent account store and ordered pair locking
//!   - [`core::bank`] - Account operations
//!   - [`core::interest`] - Loan interest accrual and the periodic scheduler
//! - [`net`] - Framing, sessions, the TCP server and a client
//!
//! # Commands
//!
//! - **create_account**: open a checking account (one per identity)
//! - **deposit** / **withdraw**: single-account balance changes
//! - **transfer_to**: move funds from the caller's own account
//! - **pay_loan_check** / **pay_loan_transfer_to**: repay a loan externally or from checking
//! - **show_history** / **show_history_filtered**: an account's ordered records
//! - **show_accountholders**: holder list, for the initial holder only
//! - **show_bank** / **apply_interest**: auditor only
//!
//! # Account Types
//!
//! - `checking`: balance conventionally non-negative
//! - `loan`: balance conventionally negative, repaid toward zero and accruing interest

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod net;
pub mod types;

pub use crate::config::Config;
pub use crate::core::{Bank, BankSettings, InterestScheduler, LedgerStore};
pub use crate::net::{LedgerClient, LedgerServer};
pub use crate::types::{
    Account, AccountKind, AccountNumber, Amount, Command, HistoryRecord, LedgerError, Operation,
    Outcome, OutcomeKind, Request,
};
