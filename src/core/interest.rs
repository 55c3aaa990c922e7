//! Loan interest accrual
//!
//! Interest is computed in exact decimal arithmetic and rounded toward
//! negative infinity, so a loan balance of `-300` at 5% becomes `-315` and
//! `-301` becomes `-317` (not `-316`).
//!
//! The `InterestScheduler` applies interest to every loan account on a fixed
//! period until the server shuts down. The first run happens one full period
//! after start.

use super::Bank;
use crate::types::{Amount, LedgerError};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Convert a configured rate into a `Decimal`
///
/// The rate is rounded to 10 decimal places so binary floating point noise
/// (`0.05` is not exactly representable) cannot shift a floored result.
///
/// # Errors
///
/// `InvalidConfig` if the rate is not finite or not greater than -1.
pub fn rate_from_f64(rate: f64) -> Result<Decimal, LedgerError> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(LedgerError::invalid_config(format!(
            "interest_rate must be a finite number greater than -1, got {}",
            rate
        )));
    }
    Decimal::from_f64(rate)
        .map(|rate| rate.round_dp(10))
        .ok_or_else(|| LedgerError::invalid_config(format!("interest_rate {} is out of range", rate)))
}

/// `floor(balance * (1 + rate))`, or `None` if the result leaves the i64 range
pub fn accrued_balance(balance: Amount, rate: Decimal) -> Option<Amount> {
    let factor = Decimal::ONE.checked_add(rate)?;
    Decimal::from(balance).checked_mul(factor)?.floor().to_i64()
}

/// Periodic interest task
#[derive(Debug)]
pub struct InterestScheduler {
    bank: Arc<Bank>,
    period: Duration,
}

impl InterestScheduler {
    /// A zero `period` disables automatic interest
    pub fn new(bank: Arc<Bank>, period: Duration) -> Self {
        Self { bank, period }
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Apply interest every period until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) {
        if self.period.is_zero() {
            info!("automatic interest disabled");
            return;
        }

        let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("interest scheduler stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let updated = self.bank.apply_interest().await;
                    info!(accounts = updated, "auto-applied interest to all loan accounts");
                }
            }
        }
    }
}
