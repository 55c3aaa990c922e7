//! Client request types
//!
//! Requests arrive as whitespace-separated `key=value` tokens:
//!
//! ```text
//! user=Alice command=transfer_to acct_num=1003 amount=500
//! ```
//!
//! `user`, `command` and `acct_num` are required (`acctNum` is accepted as an
//! alias). `amount` defaults to 0 and `operation` is the optional history filter.

use super::account::{AccountNumber, Amount};
use super::error::LedgerError;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Commands understood by the session dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    CreateAccount,
    ShowBank,
    ShowAccountHolders,
    Deposit,
    Withdraw,
    TransferTo,
    PayLoanCheck,
    PayLoanTransferTo,
    ShowHistory,
    ShowHistoryFiltered,
    ApplyInterest,
}

impl Command {
    pub const ALL: [Command; 11] = [
        Command::CreateAccount,
        Command::ShowBank,
        Command::ShowAccountHolders,
        Command::Deposit,
        Command::Withdraw,
        Command::TransferTo,
        Command::PayLoanCheck,
        Command::PayLoanTransferTo,
        Command::ShowHistory,
        Command::ShowHistoryFiltered,
        Command::ApplyInterest,
    ];

    /// Wire name of the command
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::CreateAccount => "create_account",
            Command::ShowBank => "show_bank",
            Command::ShowAccountHolders => "show_accountholders",
            Command::Deposit => "deposit",
            Command::Withdraw => "withdraw",
            Command::TransferTo => "transfer_to",
            Command::PayLoanCheck => "pay_loan_check",
            Command::PayLoanTransferTo => "pay_loan_transfer_to",
            Command::ShowHistory => "show_history",
            Command::ShowHistoryFiltered => "show_history_filtered",
            Command::ApplyInterest => "apply_interest",
        }
    }
}

impl FromStr for Command {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| LedgerError::unknown_command(s))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded client request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Calling identity (plaintext, not authenticated)
    pub user: String,

    pub command: Command,

    /// Account the command addresses (target for transfers)
    pub account: AccountNumber,

    /// Amount, 0 when the request carries none
    pub amount: Amount,

    /// Operation-kind filter for `show_history_filtered`
    pub operation: Option<String>,
}

impl Request {
    pub fn new(user: &str, command: Command, account: AccountNumber) -> Self {
        Request {
            user: user.to_string(),
            command,
            account,
            amount: 0,
            operation: None,
        }
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    /// Decode a request from its wire text
    ///
    /// # Errors
    ///
    /// - `MalformedRequest` if a token is not `key=value`, a required key is
    ///   missing or empty, or a number does not parse
    /// - `UnknownCommand` if the request is well formed but names no command
    pub fn parse(text: &str) -> Result<Self, LedgerError> {
        let mut fields: HashMap<&str, &str> = HashMap::new();
        for token in text.split_whitespace() {
            let (key, value) = token
                .split_once('=')
                .ok_or_else(|| LedgerError::malformed(format!("token '{}' is not key=value", token)))?;
            fields.insert(key, value);
        }

        let user = required(&fields, &["user"])?;
        let command = required(&fields, &["command"])?;
        let account = required(&fields, &["acct_num", "acctNum"])?;

        let account: AccountNumber = account
            .parse()
            .map_err(|_| LedgerError::malformed(format!("account number '{}' is not an integer", account)))?;
        let amount: Amount = match fields.get("amount") {
            Some(raw) => raw
                .parse()
                .map_err(|_| LedgerError::malformed(format!("amount '{}' is not an integer", raw)))?,
            None => 0,
        };
        let command: Command = command.parse()?;

        Ok(Request {
            user: user.to_string(),
            command,
            account,
            amount,
            operation: fields
                .get("operation")
                .filter(|op| !op.is_empty())
                .map(|op| op.to_string()),
        })
    }

    /// Encode the request the way clients put it on the wire
    pub fn to_wire(&self) -> String {
        let mut text = format!(
            "user={} command={} acct_num={} amount={}",
            self.user, self.command, self.account, self.amount
        );
        if let Some(operation) = &self.operation {
            text.push_str(" operation=");
            text.push_str(operation);
        }
        text
    }
}

/// First non-empty value among `keys`
fn required<'a>(fields: &HashMap<&str, &'a str>, keys: &[&str]) -> Result<&'a str, LedgerError> {
    keys.iter()
        .find_map(|key| fields.get(key).copied())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| LedgerError::malformed(format!("missing required key '{}'", keys[0])))
}
