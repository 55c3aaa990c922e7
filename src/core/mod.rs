//! Core business logic module
//!
//! This module contains the ledger components:
//! - `store` - Concurrent account store and ordered two-account locking
//! - `bank` - Account operations executed on behalf of clients
//! - `interest` - Loan interest accrual and the periodic scheduler
//! - `seed` - Demo accounts installed at startup

pub mod bank;
pub mod interest;
pub mod seed;
pub mod store;

pub use bank::{Bank, BankSettings};
pub use interest::InterestScheduler;
pub use store::LedgerStore;
