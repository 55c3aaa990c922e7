//! Error types for the bank server
//!
//! Every failure an operation can produce is a `LedgerError`. The `Display`
//! text of each variant is the message sent back to the client, so the wording
//! matches what existing front ends already display.
//!
//! # Error Categories
//!
//! - **Protocol Errors**: malformed requests, unknown commands
//! - **Lookup Errors**: account or owner not found
//! - **Authorization Errors**: caller is not a holder, initial holder or auditor
//! - **Validation Errors**: non-positive amounts, insufficient balance, collisions
//! - **Transport Errors**: I/O failures, closed connections, bad configuration

use super::account::{AccountNumber, Amount};
use super::outcome::OutcomeKind;
use super::request::Command;
use thiserror::Error;

/// Main error type for the ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The request text could not be decoded into `key=value` pairs with the
    /// required keys present
    #[error("Invalid request format.")]
    MalformedRequest {
        /// What was wrong with the request (logged, not sent)
        reason: String,
    },

    /// The `command` key named no known command
    #[error("Invalid command.")]
    UnknownCommand {
        /// The command string as received
        command: String,
    },

    /// No account has the requested number
    #[error("The account number was not found")]
    AccountNotFound {
        /// The number that was looked up
        number: AccountNumber,
    },

    /// Transfer target does not exist
    #[error("Target account does not exist")]
    TargetAccountNotFound {
        /// The requested target number
        number: AccountNumber,
    },

    /// Repayment target does not exist (or, for `pay_loan_transfer_to`, is
    /// not a loan account)
    #[error("{}", loan_not_found_message(.command))]
    LoanAccountNotFound {
        /// The requested loan account number
        number: AccountNumber,
        /// Repayment command that looked the account up
        command: Command,
    },

    /// Repayment target exists but is a checking account
    #[error("The target account is not a loan account and cannot do repayment operation.")]
    NotLoanAccount {
        /// The account that was addressed
        number: AccountNumber,
    },

    /// The caller is not the initial holder of any account
    #[error("The user must be an initiate cardholder of an account in the bank in order to perform a transfer operation")]
    NoSourceAccount {
        /// The calling identity
        user: String,
    },

    /// The caller is not the initial holder of any checking account
    #[error("The user's initial checking account has not been found and the repayment operation cannot be performed.")]
    NoCheckingAccount {
        /// The calling identity
        user: String,
    },

    /// The identity already created an account
    #[error("One person can only create one account")]
    OwnerAlreadyExists {
        /// The identity that tried to create a second account
        user: String,
    },

    /// The requested account number is taken
    #[error("The account number has been used by {owner}")]
    AccountNumberInUse {
        /// The colliding number
        number: AccountNumber,
        /// Initial holder of the existing account
        owner: String,
    },

    /// Amount was zero or negative where a positive amount is required
    #[error("{}", non_positive_message(.command))]
    NonPositiveAmount {
        /// Command that rejected the amount
        command: Command,
        /// The rejected amount
        amount: Amount,
    },

    /// `create_account` was asked to open with a negative balance
    #[error("Opening balance must not be negative")]
    NegativeOpeningBalance {
        /// The rejected amount
        amount: Amount,
    },

    /// Balance does not cover the requested debit
    #[error("{}", insufficient_funds_message(.command, .balance))]
    InsufficientFunds {
        /// Command attempting the debit
        command: Command,
        /// Account being debited
        number: AccountNumber,
        /// Balance at the time of the check
        balance: Amount,
        /// Requested debit
        requested: Amount,
    },

    /// Source and target of a two-account operation are the same account
    #[error("Source and target accounts must be different")]
    SameAccount {
        /// The account number used on both sides
        number: AccountNumber,
    },

    /// The caller is not listed among the account's holders
    #[error("{}", not_holder_message(.command))]
    NotAccountHolder {
        /// The calling identity
        user: String,
        /// The account addressed
        number: AccountNumber,
        /// What the caller tried to do
        command: Command,
    },

    /// The caller is not the initial holder of the account
    #[error("Only the account initiate holder has access to view all account holders")]
    NotInitialHolder {
        /// The calling identity
        user: String,
        /// The account addressed
        number: AccountNumber,
    },

    /// Privileged command issued by someone other than the auditor
    #[error("{}", auditor_only_message(.command, .auditor))]
    AuditorOnly {
        /// The calling identity
        user: String,
        /// The configured auditor identity
        auditor: String,
        /// What the caller tried to do
        command: Command,
    },

    /// Balance arithmetic would leave the i64 range
    #[error("Arithmetic overflow in {operation} for account {number}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: &'static str,
        /// Account involved
        number: AccountNumber,
    },

    /// Configuration could not be loaded or is out of range
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },

    /// I/O error on a socket or file
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// The peer closed the connection before a full response arrived
    #[error("Connection closed by peer")]
    ConnectionClosed,
}

impl LedgerError {
    /// Classify the error for callers that need more than the message text
    pub fn kind(&self) -> OutcomeKind {
        match self {
            LedgerError::MalformedRequest { .. } => OutcomeKind::MalformedRequest,
            LedgerError::UnknownCommand { .. } => OutcomeKind::UnknownCommand,
            LedgerError::AccountNotFound { .. }
            | LedgerError::TargetAccountNotFound { .. }
            | LedgerError::LoanAccountNotFound { .. }
            | LedgerError::NoSourceAccount { .. }
            | LedgerError::NoCheckingAccount { .. } => OutcomeKind::NotFound,
            LedgerError::NotAccountHolder { .. }
            | LedgerError::NotInitialHolder { .. }
            | LedgerError::AuditorOnly { .. } => OutcomeKind::Unauthorized,
            LedgerError::NotLoanAccount { .. }
            | LedgerError::OwnerAlreadyExists { .. }
            | LedgerError::AccountNumberInUse { .. }
            | LedgerError::NonPositiveAmount { .. }
            | LedgerError::NegativeOpeningBalance { .. }
            | LedgerError::InsufficientFunds { .. }
            | LedgerError::SameAccount { .. }
            | LedgerError::ArithmeticOverflow { .. } => OutcomeKind::Rejected,
            LedgerError::InvalidConfig { .. }
            | LedgerError::Io { .. }
            | LedgerError::ConnectionClosed => OutcomeKind::Internal,
        }
    }

    /// Create a MalformedRequest error
    pub fn malformed(reason: impl Into<String>) -> Self {
        LedgerError::MalformedRequest {
            reason: reason.into(),
        }
    }

    /// Create an UnknownCommand error
    pub fn unknown_command(command: &str) -> Self {
        LedgerError::UnknownCommand {
            command: command.to_string(),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(number: AccountNumber) -> Self {
        LedgerError::AccountNotFound { number }
    }

    /// Create a NonPositiveAmount error
    pub fn non_positive_amount(command: Command, amount: Amount) -> Self {
        LedgerError::NonPositiveAmount { command, amount }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(
        command: Command,
        number: AccountNumber,
        balance: Amount,
        requested: Amount,
    ) -> Self {
        LedgerError::InsufficientFunds {
            command,
            number,
            balance,
            requested,
        }
    }

    /// Create a NotAccountHolder error
    pub fn not_account_holder(user: &str, number: AccountNumber, command: Command) -> Self {
        LedgerError::NotAccountHolder {
            user: user.to_string(),
            number,
            command,
        }
    }

    /// Create an AuditorOnly error
    pub fn auditor_only(user: &str, auditor: &str, command: Command) -> Self {
        LedgerError::AuditorOnly {
            user: user.to_string(),
            auditor: auditor.to_string(),
            command,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &'static str, number: AccountNumber) -> Self {
        LedgerError::ArithmeticOverflow { operation, number }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        LedgerError::InvalidConfig {
            message: message.into(),
        }
    }
}

// Per-command wording of the shared rejections. Clients display these strings
// as-is, so each command keeps its established text.

fn non_positive_message(command: &Command) -> &'static str {
    match command {
        Command::Withdraw => "The withdrawal amount must be a positive number",
        Command::TransferTo => "The transfer amount must be a positive number",
        Command::PayLoanCheck | Command::PayLoanTransferTo => "Repayment amount must be positive",
        _ => "Deposit amount must be positive",
    }
}

fn insufficient_funds_message(command: &Command, balance: &Amount) -> String {
    match command {
        Command::PayLoanTransferTo => format!("Insufficient balance, current balance is {}", balance),
        _ => format!(
            "The account balance is insufficient and the current balance is {}",
            balance
        ),
    }
}

fn not_holder_message(command: &Command) -> &'static str {
    match command {
        Command::Withdraw => "Only the account holder can withdraw",
        Command::PayLoanCheck => "Only account holders can make repayments on this loan account",
        Command::PayLoanTransferTo => "Only loan account holders can make repayment",
        _ => "Only account holders can view the operation history of the account",
    }
}

fn loan_not_found_message(command: &Command) -> &'static str {
    match command {
        Command::PayLoanTransferTo => "Loan account not found",
        _ => "The loan account was not found",
    }
}

fn auditor_only_message(command: &Command, auditor: &str) -> String {
    match command {
        Command::ApplyInterest => format!("Only {} can apply interest.", auditor),
        _ => format!("Access denied: only {} can view all bank accounts", auditor),
    }
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

// Conversion from serde_json::Error to LedgerError (config files only)
impl From<serde_json::Error> for LedgerError {
    fn from(error: serde_json::Error) -> Self {
        LedgerError::InvalidConfig {
            message: error.to_string(),
        }
    }
}
