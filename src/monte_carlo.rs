//! Monte Carlo batch simulation
//!
//! Runs many independent challenge simulations with consecutive seeds and
//! aggregates pass and breach rates. Run `i` uses `config.seed + i`, so a batch
//! is reproducible and its first run matches a single simulation.

use anyhow::{ensure, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ChallengeConfig;
use crate::evaluator::{evaluate, Outcome};
use crate::returns::generate_daily_pnls;

/// Aggregated results from a batch of simulations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResults {
    pub simulations: usize,
    pub passed: usize,
    pub daily_loss_breaches: usize,
    pub total_loss_breaches: usize,
    pub failed_timeout: usize,
    /// Day the target was reached, one per passing run
    pub days_to_pass: Vec<u32>,
    /// Max drawdown in dollars, one per run
    pub max_drawdowns: Vec<f64>,
}

impl BatchResults {
    fn record(&mut self, outcome: Outcome, max_drawdown: f64) {
        self.simulations += 1;
        match outcome {
            Outcome::TargetReached(day) => {
                self.passed += 1;
                self.days_to_pass.push(day);
            }
            Outcome::DailyLossBreach(_) => self.daily_loss_breaches += 1,
            Outcome::TotalLossBreach(_) => self.total_loss_breaches += 1,
            Outcome::Failed => self.failed_timeout += 1,
        }
        self.max_drawdowns.push(max_drawdown);
    }

    fn rate(&self, count: usize) -> f64 {
        if self.simulations == 0 {
            return 0.0;
        }
        count as f64 / self.simulations as f64 * 100.0
    }

    /// Percent of runs that reached the target
    pub fn pass_rate(&self) -> f64 {
        self.rate(self.passed)
    }

    pub fn daily_breach_rate(&self) -> f64 {
        self.rate(self.daily_loss_breaches)
    }

    pub fn total_breach_rate(&self) -> f64 {
        self.rate(self.total_loss_breaches)
    }

    pub fn timeout_rate(&self) -> f64 {
        self.rate(self.failed_timeout)
    }

    pub fn avg_days_to_pass(&self) -> Option<f64> {
        if self.days_to_pass.is_empty() {
            return None;
        }
        let total: f64 = self.days_to_pass.iter().map(|&d| d as f64).sum();
        Some(total / self.days_to_pass.len() as f64)
    }

    pub fn median_days_to_pass(&self) -> Option<u32> {
        if self.days_to_pass.is_empty() {
            return None;
        }
        let mut sorted = self.days_to_pass.clone();
        sorted.sort_unstable();
        Some(sorted[sorted.len() / 2])
    }

    /// Max drawdown at percentile `p` (0.0..=1.0) across all runs
    pub fn drawdown_percentile(&self, p: f64) -> Option<f64> {
        if self.max_drawdowns.is_empty() {
            return None;
        }
        let mut sorted = self.max_drawdowns.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let idx = ((sorted.len() as f64 * p.clamp(0.0, 1.0)) as usize).min(sorted.len() - 1);
        Some(sorted[idx])
    }
}

/// Run `num_simulations` challenges in parallel
pub fn simulate_batch(config: &ChallengeConfig, num_simulations: usize) -> Result<BatchResults> {
    config.validate()?;
    ensure!(num_simulations > 0, "number of simulations must be at least 1");

    info!(
        "Running {} simulations (seeds {}..)",
        num_simulations, config.seed
    );

    let runs = (0..num_simulations)
        .into_par_iter()
        .map(|i| -> Result<(Outcome, f64)> {
            let run_config = ChallengeConfig {
                seed: config.seed.wrapping_add(i as u64),
                ..config.clone()
            };
            let pnls = generate_daily_pnls(&run_config)?;
            let eval = evaluate(&run_config, &pnls)?;
            Ok((eval.outcome, eval.max_drawdown()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut results = BatchResults::default();
    for (outcome, max_drawdown) in runs {
        results.record(outcome, max_drawdown);
    }

    info!(
        "Batch complete: {}/{} passed ({:.2}%)",
        results.passed,
        results.simulations,
        results.pass_rate()
    );
    Ok(results)
}

/// Print a batch summary
pub fn print_batch_results(config: &ChallengeConfig, results: &BatchResults) {
    let limits = config.limits();

    println!("\n{}", "=".repeat(60));
    println!("CHALLENGE MONTE CARLO ({} runs)", results.simulations);
    println!("{}", "=".repeat(60));
    println!(
        "Account: ${:.0} | Target: ${:.0} | Daily loss: ${:.0} | Total loss: ${:.0}",
        config.account_size, limits.profit_target, limits.max_daily_loss, limits.max_total_loss
    );
    println!(
        "Days: {} | Daily PnL: mean ${:.0}, std dev ${:.0} | Seed: {}",
        config.trading_days, config.mean_daily_return, config.daily_std_dev, config.seed
    );
    println!("{}", "-".repeat(40));

    println!("  PASSED:              {} ({:.2}%)", results.passed, results.pass_rate());
    println!(
        "  Failed (daily loss): {} ({:.2}%)",
        results.daily_loss_breaches,
        results.daily_breach_rate()
    );
    println!(
        "  Failed (total loss): {} ({:.2}%)",
        results.total_loss_breaches,
        results.total_breach_rate()
    );
    println!(
        "  Failed (timeout):    {} ({:.2}%)",
        results.failed_timeout,
        results.timeout_rate()
    );

    if let (Some(avg), Some(median)) = (results.avg_days_to_pass(), results.median_days_to_pass()) {
        println!();
        println!("  Avg days to pass:    {:.1}", avg);
        println!("  Median days to pass: {}", median);
    }

    if let (Some(p50), Some(p95)) = (
        results.drawdown_percentile(0.50),
        results.drawdown_percentile(0.95),
    ) {
        println!("  Median max drawdown: ${:.0}", p50);
        println!("  95th %ile drawdown:  ${:.0}", p95);
    }
}
