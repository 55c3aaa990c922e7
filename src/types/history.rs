//! Transaction history records
//!
//! Each account keeps an ordered list of `HistoryRecord`s. Records are created
//! once, appended under the account lock and never modified afterwards.

use super::account::{AccountNumber, Amount};
use std::fmt;

/// Actor recorded for entries the server makes on its own (interest)
pub const SYSTEM_ACTOR: &str = "System";

/// Kind of operation a history record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Deposit,
    Withdraw,
    /// Debit side of `transfer_to`
    TransferOut,
    /// Credit side of `transfer_to`
    TransferIn,
    /// Loan repayment with external funds
    PayLoan,
    /// Debit side of `pay_loan_transfer_to`
    TransferToLoan,
    /// Credit side of `pay_loan_transfer_to`
    LoanPaymentReceived,
    /// Interest accrued by the scheduler or the manual command
    Interest,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::Deposit,
        Operation::Withdraw,
        Operation::TransferOut,
        Operation::TransferIn,
        Operation::PayLoan,
        Operation::TransferToLoan,
        Operation::LoanPaymentReceived,
        Operation::Interest,
    ];

    /// Name used on the wire and in filters
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Deposit => "deposit",
            Operation::Withdraw => "withdraw",
            Operation::TransferOut => "transfer_out",
            Operation::TransferIn => "transfer_in",
            Operation::PayLoan => "pay_loan",
            Operation::TransferToLoan => "transfer_to_loan",
            Operation::LoanPaymentReceived => "loan_payment_received",
            Operation::Interest => "interest",
        }
    }

    /// Look an operation up by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Operation::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable entry in an account's history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    /// Identity that caused the entry
    pub actor: String,

    pub operation: Operation,

    /// Amount moved (for interest: the signed balance delta)
    pub amount: Amount,

    /// The other account of a two-account operation
    pub counterparty: Option<AccountNumber>,
}

impl HistoryRecord {
    pub fn new(actor: &str, operation: Operation, amount: Amount) -> Self {
        HistoryRecord {
            actor: actor.to_string(),
            operation,
            amount,
            counterparty: None,
        }
    }

    /// Record for one side of a two-account operation
    pub fn with_counterparty(
        actor: &str,
        operation: Operation,
        amount: Amount,
        counterparty: AccountNumber,
    ) -> Self {
        HistoryRecord {
            counterparty: Some(counterparty),
            ..HistoryRecord::new(actor, operation, amount)
        }
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.counterparty {
            Some(other) => write!(
                f,
                "({}, {}, {}, {})",
                self.actor, self.operation, self.amount, other
            ),
            None => write!(f, "({}, {}, {})", self.actor, self.operation, self.amount),
        }
    }
}

/// Select the records whose operation name equals `filter`, keeping order.
///
/// `None` selects everything. A filter naming no known operation selects
/// nothing.
pub fn filter_history<'a>(
    records: &'a [HistoryRecord],
    filter: Option<&str>,
) -> Vec<&'a HistoryRecord> {
    match filter {
        None => records.iter().collect(),
        Some(name) => match Operation::from_name(name) {
            Some(operation) => records
                .iter()
                .filter(|record| record.operation == operation)
                .collect(),
            None => Vec::new(),
        },
    }
}
