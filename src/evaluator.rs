//! Challenge evaluation
//!
//! Walks the account balance through a daily PnL sequence and stops at the
//! first day that breaches a loss limit or reaches the profit target.
//!
//! Stop conditions are checked after the day's PnL is applied, in this order:
//! 1. Daily loss: `pnl < -max_daily_loss` (a loss exactly at the limit is allowed)
//! 2. Total loss: `account_size - balance > max_total_loss` (strict as well)
//! 3. Target: `balance >= account_size + profit_target` (exact target passes)

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ChallengeConfig;

/// How a simulated challenge ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "day")]
pub enum Outcome {
    DailyLossBreach(u32),
    TotalLossBreach(u32),
    TargetReached(u32),
    /// Ran out of trading days without hitting the target
    Failed,
}

impl Outcome {
    /// Day the run stopped on, if it stopped early
    pub fn day(&self) -> Option<u32> {
        match self {
            Self::DailyLossBreach(day) | Self::TotalLossBreach(day) | Self::TargetReached(day) => {
                Some(*day)
            }
            Self::Failed => None,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::TargetReached(_))
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DailyLossBreach(day) => write!(f, "Day {}: Daily loss limit exceeded!", day),
            Self::TotalLossBreach(day) => write!(f, "Day {}: Total loss limit exceeded!", day),
            Self::TargetReached(day) => {
                write!(f, "Day {}: Profit target achieved! Challenge passed.", day)
            }
            Self::Failed => write!(f, "Challenge failed. Profit target not reached."),
        }
    }
}

/// One processed trading day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// 1-based day number
    pub day: u32,
    pub pnl: f64,
    /// Balance after this day's PnL
    pub balance: f64,
    /// `balance - account_size`
    pub cumulative_gain: f64,
}

/// Result of evaluating one PnL sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub outcome: Outcome,
    /// Starting balance followed by the balance after each processed day
    pub equity_curve: Vec<f64>,
    pub ledger: Vec<LedgerEntry>,
}

impl Evaluation {
    pub fn days_processed(&self) -> usize {
        self.ledger.len()
    }

    pub fn final_balance(&self) -> f64 {
        // Curve always holds at least the starting balance
        self.equity_curve.last().copied().unwrap_or_default()
    }

    /// Largest drop below the starting balance over the run (0 if never below)
    pub fn max_drawdown(&self) -> f64 {
        let start = self.equity_curve.first().copied().unwrap_or_default();
        self.equity_curve
            .iter()
            .map(|balance| start - balance)
            .fold(0.0, f64::max)
    }

    /// Day with the most negative PnL
    pub fn worst_day(&self) -> Option<&LedgerEntry> {
        self.ledger
            .iter()
            .min_by(|a, b| a.pnl.total_cmp(&b.pnl))
    }
}

/// Run the challenge rules over `daily_pnls`.
///
/// `daily_pnls` must hold exactly `config.trading_days` finite values.
pub fn evaluate(config: &ChallengeConfig, daily_pnls: &[f64]) -> Result<Evaluation> {
    config.validate()?;
    ensure!(
        daily_pnls.len() == config.trading_days as usize,
        "expected {} daily PnL values, got {}",
        config.trading_days,
        daily_pnls.len()
    );
    if let Some(pos) = daily_pnls.iter().position(|p| !p.is_finite()) {
        anyhow::bail!("daily PnL for day {} is not finite", pos + 1);
    }

    let limits = config.limits();
    let account_size = config.account_size;
    let target_balance = limits.target_balance();

    let mut balance = account_size;
    let mut equity_curve = Vec::with_capacity(daily_pnls.len() + 1);
    let mut ledger = Vec::with_capacity(daily_pnls.len());
    equity_curve.push(balance);

    for (day, &pnl) in (1u32..).zip(daily_pnls) {
        balance += pnl;
        equity_curve.push(balance);
        ledger.push(LedgerEntry {
            day,
            pnl,
            balance,
            cumulative_gain: balance - account_size,
        });

        let drawdown = account_size - balance;
        debug!(
            "Day {}: pnl={:.2} balance={:.2} drawdown={:.2}",
            day, pnl, balance, drawdown
        );

        let stop = if pnl < -limits.max_daily_loss {
            Some(Outcome::DailyLossBreach(day))
        } else if drawdown > limits.max_total_loss {
            Some(Outcome::TotalLossBreach(day))
        } else if balance >= target_balance {
            Some(Outcome::TargetReached(day))
        } else {
            None
        };

        if let Some(outcome) = stop {
            debug!("{}", outcome);
            return Ok(Evaluation { outcome, equity_curve, ledger });
        }
    }

    debug!("{}", Outcome::Failed);
    Ok(Evaluation {
        outcome: Outcome::Failed,
        equity_curve,
        ledger,
    })
}
