//! Account operations
//!
//! This module provides the `Bank`, which executes decoded client requests
//! against the shared `LedgerStore`.
//!
//! # Design
//!
//! Every operation validates what it can without locks (amount sign, account
//! existence, holder membership), then takes the account mutexes it needs,
//! re-checks anything another task could have changed, mutates, appends the
//! history records and releases. Balances are only ever read for a decision
//! and written back under the same lock.
//!
//! ```text
//! Bank
//!     ├── Arc<LedgerStore>  (accounts, per-account mutexes)
//!     └── BankSettings      (interest rate, critical-section delay, auditor)
//! ```
//!
//! Operations return `Result<String, LedgerError>`; `execute` turns that into
//! the `Outcome` sent back to the client. No failure is fatal to a session.

use super::interest::{accrued_balance, rate_from_f64};
use super::seed::seed_accounts;
use super::store::{lock_pair, LedgerStore};
use crate::config::Config;
use crate::types::{
    filter_history, Account, AccountNumber, Command, HistoryRecord, LedgerError, Operation,
    Outcome, Request, SYSTEM_ACTOR,
};
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tunables for account operations
#[derive(Debug, Clone, PartialEq)]
pub struct BankSettings {
    /// Loan interest rate per application
    pub interest_rate: Decimal,

    /// Pause held inside every mutating critical section, zero to disable
    pub critical_section_delay: Duration,

    /// Identity allowed to run `show_bank` and `apply_interest`
    pub auditor: String,
}

impl Default for BankSettings {
    fn default() -> Self {
        Self {
            interest_rate: Decimal::new(5, 2),
            critical_section_delay: Duration::ZERO,
            auditor: "Audit".to_string(),
        }
    }
}

impl BankSettings {
    pub fn from_config(config: &Config) -> Result<Self, LedgerError> {
        Ok(Self {
            interest_rate: rate_from_f64(config.interest_rate)?,
            critical_section_delay: config.critical_section_delay(),
            auditor: config.auditor.clone(),
        })
    }
}

/// Executes requests against the ledger
#[derive(Debug)]
pub struct Bank {
    store: Arc<LedgerStore>,
    settings: BankSettings,
}

impl Bank {
    pub fn new(store: Arc<LedgerStore>, settings: BankSettings) -> Self {
        Self { store, settings }
    }

    /// Build a bank from configuration, installing the demo accounts when
    /// `seed_accounts` is set
    pub fn from_config(config: &Config) -> Result<Self, LedgerError> {
        let settings = BankSettings::from_config(config)?;
        let store = if config.seed_accounts {
            LedgerStore::with_accounts(seed_accounts())?
        } else {
            LedgerStore::new()
        };
        info!(accounts = store.len(), "ledger initialized");
        Ok(Self::new(Arc::new(store), settings))
    }

    pub fn store(&self) -> &Arc<LedgerStore> {
        &self.store
    }

    pub fn settings(&self) -> &BankSettings {
        &self.settings
    }

    /// Run one request to completion
    pub async fn execute(&self, request: &Request) -> Outcome {
        let result = match request.command {
            Command::CreateAccount => self.create_account(request),
            Command::ShowBank => self.show_bank(request).await,
            Command::ShowAccountHolders => self.show_account_holders(request),
            Command::Deposit => self.deposit(request).await,
            Command::Withdraw => self.withdraw(request).await,
            Command::TransferTo => self.transfer_to(request).await,
            Command::PayLoanCheck => self.pay_loan_check(request).await,
            Command::PayLoanTransferTo => self.pay_loan_transfer_to(request).await,
            Command::ShowHistory => self.show_history(request, None).await,
            Command::ShowHistoryFiltered => {
                self.show_history(request, Some(request.operation.as_deref()))
                    .await
            }
            Command::ApplyInterest => self.apply_interest_command(request).await,
        };

        if let Err(error) = &result {
            info!(
                user = %request.user,
                command = %request.command,
                account = request.account,
                kind = ?error.kind(),
                %error,
                "request rejected"
            );
        }
        result.into()
    }

    fn create_account(&self, request: &Request) -> Result<String, LedgerError> {
        if request.amount < 0 {
            return Err(LedgerError::NegativeOpeningBalance {
                amount: request.amount,
            });
        }

        let account = self.store.append_account(Account::checking(
            request.account,
            &request.user,
            request.amount,
        ))?;
        info!(
            user = %request.user,
            account = account.number,
            balance = request.amount,
            "created checking account"
        );

        Ok(format!(
            "Successfully created checking account for {} with account number {}.",
            request.user, account.number
        ))
    }

    async fn show_bank(&self, request: &Request) -> Result<String, LedgerError> {
        self.require_auditor(request, Command::ShowBank)?;

        let mut rows = Vec::with_capacity(self.store.len());
        for account in self.store.accounts() {
            let snapshot = account.snapshot().await;
            let history: Vec<String> = snapshot.history.iter().map(ToString::to_string).collect();
            rows.push([
                snapshot.number.to_string(),
                snapshot.kind.to_string(),
                snapshot.initial_holder,
                snapshot.holders.join(", "),
                snapshot.balance.to_string(),
                format!("[{}]", history.join(", ")),
            ]);
        }

        Ok(format!(
            "All account information is as follows:\n{}",
            render_table(
                [
                    "acct_num",
                    "acct_type",
                    "init_holder",
                    "acct_holder",
                    "balance",
                    "history"
                ],
                &rows
            )
        ))
    }

    fn show_account_holders(&self, request: &Request) -> Result<String, LedgerError> {
        let account = self.require_account(request.account)?;
        if account.initial_holder != request.user {
            return Err(LedgerError::NotInitialHolder {
                user: request.user.clone(),
                number: account.number,
            });
        }

        Ok(format!(
            "All the account holders for account {} are: {}",
            account.number,
            account.holders.join(", ")
        ))
    }

    async fn deposit(&self, request: &Request) -> Result<String, LedgerError> {
        let account = self.require_account(request.account)?;
        let amount = request.amount;
        if amount < 0 {
            return Err(LedgerError::non_positive_amount(Command::Deposit, amount));
        }
        if amount == 0 {
            return Ok(balance_message(account.number, account.balance().await));
        }

        let mut state = account.lock().await;
        debug!(account = account.number, "locked account for deposit");
        self.critical_section_pause().await;

        state.balance = state
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", account.number))?;
        state.record(HistoryRecord::new(&request.user, Operation::Deposit, amount));
        let balance = state.balance;
        drop(state);
        debug!(account = account.number, "unlocked account after deposit");

        Ok(format!(
            "Successfully deposited {} dollars into account {}, current balance is {} dollars",
            amount, account.number, balance
        ))
    }

    async fn withdraw(&self, request: &Request) -> Result<String, LedgerError> {
        let account = self.require_account(request.account)?;
        let amount = request.amount;
        if amount < 0 {
            return Err(LedgerError::non_positive_amount(Command::Withdraw, amount));
        }
        if !account.is_holder(&request.user) {
            return Err(LedgerError::not_account_holder(
                &request.user,
                account.number,
                Command::Withdraw,
            ));
        }
        if amount == 0 {
            return Ok(balance_message(account.number, account.balance().await));
        }

        let observed = account.balance().await;
        if observed < amount {
            return Err(LedgerError::insufficient_funds(
                Command::Withdraw,
                account.number,
                observed,
                amount,
            ));
        }

        let mut state = account.lock().await;
        debug!(account = account.number, "locked account for withdrawal");
        self.critical_section_pause().await;

        if state.balance < amount {
            return Err(LedgerError::insufficient_funds(
                Command::Withdraw,
                account.number,
                state.balance,
                amount,
            ));
        }
        state.balance -= amount;
        state.record(HistoryRecord::new(&request.user, Operation::Withdraw, amount));
        let balance = state.balance;
        drop(state);
        debug!(account = account.number, "unlocked account after withdrawal");

        Ok(format!(
            "{} successfully withdrew {} dollars from account {}. Current balance is {}",
            request.user, amount, account.number, balance
        ))
    }

    async fn transfer_to(&self, request: &Request) -> Result<String, LedgerError> {
        let amount = request.amount;
        if amount <= 0 {
            return Err(LedgerError::non_positive_amount(Command::TransferTo, amount));
        }
        let source = self.store.find_by_initial_holder(&request.user).ok_or_else(|| {
            LedgerError::NoSourceAccount {
                user: request.user.clone(),
            }
        })?;
        let target = self.store.find_account(request.account).ok_or(
            LedgerError::TargetAccountNotFound {
                number: request.account,
            },
        )?;
        if source.number == target.number {
            return Err(LedgerError::SameAccount {
                number: source.number,
            });
        }
        let observed = source.balance().await;
        if observed < amount {
            return Err(LedgerError::insufficient_funds(
                Command::TransferTo,
                source.number,
                observed,
                amount,
            ));
        }

        let mut pair = lock_pair(&source, &target).await?;
        self.critical_section_pause().await;

        let (from, to) = pair.states(source.number);
        if from.balance < amount {
            return Err(LedgerError::insufficient_funds(
                Command::TransferTo,
                source.number,
                from.balance,
                amount,
            ));
        }
        let credited = to
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", target.number))?;
        from.balance -= amount;
        to.balance = credited;
        from.record(HistoryRecord::with_counterparty(
            &request.user,
            Operation::TransferOut,
            amount,
            target.number,
        ));
        to.record(HistoryRecord::with_counterparty(
            &request.user,
            Operation::TransferIn,
            amount,
            source.number,
        ));
        let (source_balance, target_balance) = (from.balance, to.balance);
        drop(pair);

        Ok(format!(
            "{} successfully transferred {} dollars from account {} to account {}. \
             Current balance for source account is {} and target account is {}.",
            request.user, amount, source.number, target.number, source_balance, target_balance
        ))
    }

    async fn pay_loan_check(&self, request: &Request) -> Result<String, LedgerError> {
        let amount = request.amount;
        if amount <= 0 {
            return Err(LedgerError::non_positive_amount(Command::PayLoanCheck, amount));
        }
        let loan = self.require_loan_account(request.account, Command::PayLoanCheck)?;
        if !loan.is_holder(&request.user) {
            return Err(LedgerError::not_account_holder(
                &request.user,
                loan.number,
                Command::PayLoanCheck,
            ));
        }

        let mut state = loan.lock().await;
        debug!(account = loan.number, "locked loan account for repayment");
        self.critical_section_pause().await;

        state.balance = state
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("repayment", loan.number))?;
        state.record(HistoryRecord::new(&request.user, Operation::PayLoan, amount));
        let balance = state.balance;
        drop(state);
        debug!(account = loan.number, "unlocked loan account after repayment");

        Ok(format!(
            "{} successfully paid {} dollars to account {}. Current loan is {}",
            request.user, amount, loan.number, balance
        ))
    }

    async fn pay_loan_transfer_to(&self, request: &Request) -> Result<String, LedgerError> {
        let amount = request.amount;
        if amount <= 0 {
            return Err(LedgerError::non_positive_amount(Command::PayLoanTransferTo, amount));
        }
        let checking = self
            .store
            .find_checking_by_initial_holder(&request.user)
            .ok_or_else(|| LedgerError::NoCheckingAccount {
                user: request.user.clone(),
            })?;
        let observed = checking.balance().await;
        if observed < amount {
            return Err(LedgerError::insufficient_funds(
                Command::PayLoanTransferTo,
                checking.number,
                observed,
                amount,
            ));
        }
        let loan = self.require_loan_account(request.account, Command::PayLoanTransferTo)?;
        if !loan.is_holder(&request.user) {
            return Err(LedgerError::not_account_holder(
                &request.user,
                loan.number,
                Command::PayLoanTransferTo,
            ));
        }

        let mut pair = lock_pair(&checking, &loan).await?;
        self.critical_section_pause().await;

        let (from, to) = pair.states(checking.number);
        if from.balance < amount {
            return Err(LedgerError::insufficient_funds(
                Command::PayLoanTransferTo,
                checking.number,
                from.balance,
                amount,
            ));
        }
        let repaid = to
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("repayment", loan.number))?;
        from.balance -= amount;
        to.balance = repaid;
        from.record(HistoryRecord::with_counterparty(
            &request.user,
            Operation::TransferToLoan,
            amount,
            loan.number,
        ));
        to.record(HistoryRecord::with_counterparty(
            &request.user,
            Operation::LoanPaymentReceived,
            amount,
            checking.number,
        ));
        let loan_balance = to.balance;
        drop(pair);

        Ok(format!(
            "{} successfully transferred {} dollars from account {} for repayment. \
             Current loan for account {} is {}",
            request.user, amount, checking.number, loan.number, loan_balance
        ))
    }

    /// `filter` is `None` for plain `show_history`, `Some(None)` for a filtered
    /// request without an `operation` key
    async fn show_history(
        &self,
        request: &Request,
        filter: Option<Option<&str>>,
    ) -> Result<String, LedgerError> {
        let account = self.require_account(request.account)?;
        if !account.is_holder(&request.user) {
            return Err(LedgerError::not_account_holder(
                &request.user,
                account.number,
                Command::ShowHistory,
            ));
        }

        let history = account.snapshot().await.history;
        let Some(operation) = filter else {
            if history.is_empty() {
                return Ok(format!("Account {} doesn't have any history now", account.number));
            }
            return Ok(format!(
                "The operation history of account {} is \n{}",
                account.number,
                join_records(history.iter())
            ));
        };

        let selected = filter_history(&history, operation);
        match (selected.is_empty(), operation) {
            (true, Some(name)) => Ok(format!(
                "No transactions found for operation '{}' in account {}",
                name, account.number
            )),
            (true, None) => Ok(format!("Account {} doesn't have any history now", account.number)),
            (false, _) => Ok(format!(
                "The filtered operation history of account {} is \n{}",
                account.number,
                join_records(selected.into_iter())
            )),
        }
    }

    async fn apply_interest_command(&self, request: &Request) -> Result<String, LedgerError> {
        self.require_auditor(request, Command::ApplyInterest)?;
        let updated = self.apply_interest().await;
        info!(user = %request.user, accounts = updated, "manually applied interest");
        Ok("Interest applied to all loan accounts.".to_string())
    }

    /// Accrue interest on every loan account, one account lock at a time,
    /// in ascending account order
    ///
    /// Returns the number of accounts updated. An account whose new balance
    /// would overflow is left untouched.
    pub async fn apply_interest(&self) -> usize {
        let rate = self.settings.interest_rate;
        let mut updated = 0;

        for loan in self.store.accounts().into_iter().filter(|account| account.is_loan()) {
            let mut state = loan.lock().await;
            let old_balance = state.balance;
            let Some((new_balance, delta)) = accrued_balance(old_balance, rate)
                .and_then(|new_balance| Some((new_balance, new_balance.checked_sub(old_balance)?)))
            else {
                warn!(account = loan.number, balance = old_balance, "interest would overflow, skipped");
                continue;
            };

            state.balance = new_balance;
            state.record(HistoryRecord::new(SYSTEM_ACTOR, Operation::Interest, delta));
            drop(state);
            updated += 1;
            info!(
                account = loan.number,
                old_balance, new_balance, "applied interest to loan account"
            );
        }

        updated
    }

    fn require_account(&self, number: AccountNumber) -> Result<Arc<Account>, LedgerError> {
        self.store
            .find_account(number)
            .ok_or_else(|| LedgerError::account_not_found(number))
    }

    /// `pay_loan_transfer_to` reports a non-loan target the same way as a
    /// missing one
    fn require_loan_account(
        &self,
        number: AccountNumber,
        command: Command,
    ) -> Result<Arc<Account>, LedgerError> {
        let account = self
            .store
            .find_account(number)
            .ok_or(LedgerError::LoanAccountNotFound { number, command })?;
        if !account.is_loan() {
            return Err(match command {
                Command::PayLoanTransferTo => LedgerError::LoanAccountNotFound { number, command },
                _ => LedgerError::NotLoanAccount { number },
            });
        }
        Ok(account)
    }

    fn require_auditor(&self, request: &Request, command: Command) -> Result<(), LedgerError> {
        if request.user != self.settings.auditor {
            return Err(LedgerError::auditor_only(
                &request.user,
                &self.settings.auditor,
                command,
            ));
        }
        Ok(())
    }

    async fn critical_section_pause(&self) {
        if !self.settings.critical_section_delay.is_zero() {
            tokio::time::sleep(self.settings.critical_section_delay).await;
        }
    }
}

fn balance_message(number: AccountNumber, balance: i64) -> String {
    format!(
        "The current balance for account {} is {} dollars",
        number, balance
    )
}

fn join_records<'a>(records: impl Iterator<Item = &'a HistoryRecord>) -> String {
    records
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Left-aligned columns separated by two spaces
fn render_table<const N: usize>(headers: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = headers.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut table = String::new();
    let header_cells = headers.map(str::to_string);
    for row in std::iter::once(&header_cells).chain(rows) {
        let mut line = String::new();
        for (column, (cell, width)) in row.iter().zip(widths).enumerate() {
            if column + 1 == N {
                line.push_str(cell);
            } else {
                let _ = write!(line, "{:<width$}  ", cell, width = width);
            }
        }
        table.push_str(line.trim_end());
        table.push('\n');
    }
    table.pop();
    table
}
