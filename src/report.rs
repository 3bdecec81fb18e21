//! Run reporting: status line, ledger table and file exports

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::config::{ChallengeConfig, ChallengeLimits};
use crate::evaluator::{Evaluation, LedgerEntry, Outcome};

/// Horizontal reference lines for an equity chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLevels {
    pub starting_balance: f64,
    pub target_balance: f64,
    pub floor_balance: f64,
}

impl From<&ChallengeLimits> for ReferenceLevels {
    fn from(limits: &ChallengeLimits) -> Self {
        Self {
            starting_balance: limits.account_size,
            target_balance: limits.target_balance(),
            floor_balance: limits.floor_balance(),
        }
    }
}

/// Ledger entry rounded to cents for display and export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "PnL")]
    pub pnl: f64,
    #[serde(rename = "Balance")]
    pub balance: f64,
    #[serde(rename = "Cumulative Gain")]
    pub cumulative_gain: f64,
}

impl From<&LedgerEntry> for LedgerRow {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            day: entry.day,
            pnl: round_cents(entry.pnl),
            balance: round_cents(entry.balance),
            cumulative_gain: round_cents(entry.cumulative_gain),
        }
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Headline numbers for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub days_processed: usize,
    /// Day the run stopped on, `None` if it used every trading day
    pub stop_day: Option<u32>,
    pub final_balance: f64,
    pub max_drawdown: f64,
    pub worst_day: Option<LedgerRow>,
}

impl From<&Evaluation> for RunSummary {
    fn from(evaluation: &Evaluation) -> Self {
        Self {
            days_processed: evaluation.days_processed(),
            stop_day: evaluation.outcome.day(),
            final_balance: round_cents(evaluation.final_balance()),
            max_drawdown: round_cents(evaluation.max_drawdown()),
            worst_day: evaluation.worst_day().map(LedgerRow::from),
        }
    }
}

/// Everything a front end needs to show one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub config: ChallengeConfig,
    pub limits: ChallengeLimits,
    pub reference_levels: ReferenceLevels,
    pub outcome: Outcome,
    pub message: String,
    pub summary: RunSummary,
    pub equity_curve: Vec<f64>,
    pub ledger: Vec<LedgerRow>,
}

impl RunReport {
    pub fn new(config: &ChallengeConfig, evaluation: &Evaluation) -> Self {
        let limits = config.limits();
        Self {
            config: config.clone(),
            limits,
            reference_levels: ReferenceLevels::from(&limits),
            outcome: evaluation.outcome,
            message: evaluation.outcome.to_string(),
            summary: RunSummary::from(evaluation),
            equity_curve: evaluation.equity_curve.clone(),
            ledger: evaluation.ledger.iter().map(LedgerRow::from).collect(),
        }
    }
}

/// Print the result and ledger to stdout
pub fn print_run(report: &RunReport) {
    let levels = &report.reference_levels;

    println!("\n{}", "=".repeat(60));
    println!("SIMULATION RESULT");
    println!("{}", "=".repeat(60));
    println!("{}", report.message);
    println!();
    println!(
        "Start: ${:.2} | Target: ${:.2} | Max drawdown line: ${:.2}",
        levels.starting_balance, levels.target_balance, levels.floor_balance
    );

    let summary = &report.summary;
    println!(
        "Days traded: {} | Final balance: ${:.2} | Max drawdown: ${:.2}",
        summary.days_processed, summary.final_balance, summary.max_drawdown
    );
    if let Some(worst) = &summary.worst_day {
        println!("Worst day: Day {} (${:.2})", worst.day, worst.pnl);
    }

    println!("\n{}", "-".repeat(60));
    println!("TRADE LOG");
    println!("{}", "-".repeat(60));
    println!("  {:>4} {:>12} {:>14} {:>16}", "Day", "PnL", "Balance", "Cumulative Gain");
    for row in &report.ledger {
        println!(
            "  {:>4} {:>12.2} {:>14.2} {:>16.2}",
            row.day, row.pnl, row.balance, row.cumulative_gain
        );
    }
}

/// Write the ledger as CSV
pub fn write_ledger_csv(path: &Path, evaluation: &Evaluation) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    for entry in &evaluation.ledger {
        writer.serialize(LedgerRow::from(entry))?;
    }
    writer.flush()?;
    info!("Wrote ledger to {:?}", path);
    Ok(())
}

/// Write any serializable report as pretty JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    info!("Wrote results to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::evaluate;

    fn sample() -> (ChallengeConfig, Evaluation) {
        let config = ChallengeConfig { trading_days: 3, ..Default::default() };
        let eval = evaluate(&config, &[1234.567, -2000.004, 50.0]).unwrap();
        (config, eval)
    }

    #[test]
    fn test_reference_levels() {
        let (config, eval) = sample();
        let report = RunReport::new(&config, &eval);
        assert_eq!(report.reference_levels.starting_balance, 100_000.0);
        assert_eq!(report.reference_levels.target_balance, 110_000.0);
        assert_eq!(report.reference_levels.floor_balance, 90_000.0);
        assert_eq!(report.message, "Challenge failed. Profit target not reached.");
    }

    #[test]
    fn test_ledger_rows_rounded() {
        let (config, eval) = sample();
        let report = RunReport::new(&config, &eval);
        assert_eq!(report.ledger.len(), 3);
        assert_eq!(report.ledger[0].pnl, 1234.57);
        assert_eq!(report.ledger[0].balance, 101_234.57);
        assert_eq!(report.ledger[1].pnl, -2000.0);
        // Curve keeps full precision
        assert!((report.equity_curve[1] - 101_234.567).abs() < 1e-9);
    }

    #[test]
    fn test_summary_from_evaluation() {
        let config = ChallengeConfig { trading_days: 5, ..Default::default() };
        let eval = evaluate(&config, &[-3_000.0, 1_000.0, -4_500.125, 500.0, 0.0]).unwrap();
        let summary = RunReport::new(&config, &eval).summary;

        assert_eq!(summary.days_processed, 5);
        assert_eq!(summary.stop_day, None);
        assert_eq!(summary.final_balance, 93_999.88);
        assert_eq!(summary.max_drawdown, 6_500.13);
        let worst = summary.worst_day.unwrap();
        assert_eq!(worst.day, 3);
        assert_eq!(worst.pnl, -4_500.13);

        let config = ChallengeConfig { trading_days: 2, ..Default::default() };
        let eval = evaluate(&config, &[2000.0, -6000.0]).unwrap();
        let summary = RunSummary::from(&eval);
        assert_eq!(summary.stop_day, Some(2));
        assert_eq!(summary.final_balance, 96_000.0);
    }

    #[test]
    fn test_ledger_csv_headers() {
        let (_, eval) = sample();
        let path = std::env::temp_dir().join(format!(
            "challenge_sim_ledger_{}.csv",
            std::process::id()
        ));
        write_ledger_csv(&path, &eval).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Day,PnL,Balance,Cumulative Gain"));
        assert_eq!(lines.next(), Some("1,1234.57,101234.57,1234.57"));
        assert_eq!(text.lines().count(), 4);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_report_json() {
        let config = ChallengeConfig { trading_days: 2, ..Default::default() };
        let eval = evaluate(&config, &[2000.0, -6000.0]).unwrap();
        let report = RunReport::new(&config, &eval);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["outcome"]["type"], "DailyLossBreach");
        assert_eq!(value["outcome"]["day"], 2);
        assert_eq!(value["equity_curve"].as_array().unwrap().len(), 3);
        assert_eq!(value["ledger"][1]["Cumulative Gain"], -4000.0);
    }
}
