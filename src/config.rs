//! Challenge configuration
//!
//! Account size, rule percentages and the daily PnL distribution for one
//! simulated evaluation. Dollar limits are derived once per run.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Seed used when none is given, so default runs are reproducible
pub const DEFAULT_SEED: u64 = 42;

/// Parameters for one challenge simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Starting balance in dollars
    pub account_size: f64,

    /// Profit target as a percent of account size
    pub profit_target_pct: f64,

    /// Largest allowed single-day loss as a percent of account size
    pub max_daily_loss_pct: f64,

    /// Largest allowed drawdown from the starting balance, percent of account size
    pub max_total_loss_pct: f64,

    /// Number of trading days to simulate
    pub trading_days: u32,

    /// Mean of the daily PnL distribution (dollars)
    pub mean_daily_return: f64,

    /// Standard deviation of the daily PnL distribution (dollars)
    pub daily_std_dev: f64,

    /// RNG seed for the daily PnL sequence
    pub seed: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        // 100K account, standard 10/5/10 rules
        Self {
            account_size: 100_000.0,
            profit_target_pct: 10.0,
            max_daily_loss_pct: 5.0,
            max_total_loss_pct: 10.0,
            trading_days: 30,
            mean_daily_return: 300.0,
            daily_std_dev: 1500.0,
            seed: DEFAULT_SEED,
        }
    }
}

impl ChallengeConfig {
    /// FTMO challenge phase: 10% target, 5% daily loss, 10% total loss
    pub fn ftmo(account_size: f64) -> Self {
        Self {
            account_size,
            ..Default::default()
        }
    }

    /// FTMO verification phase: 5% target over 60 days, same loss rules
    pub fn ftmo_verification(account_size: f64) -> Self {
        Self {
            account_size,
            profit_target_pct: 5.0,
            trading_days: 60,
            ..Default::default()
        }
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        Self::default().with_json_file(path)
    }

    /// Overlay the fields present in a JSON file onto this config.
    /// Fields the file leaves out keep their current values.
    pub fn with_json_file(self, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let overlay: serde_json::Value = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        let serde_json::Value::Object(fields) = overlay else {
            bail!("Config file {:?} must contain a JSON object", path);
        };

        let mut merged = serde_json::to_value(&self)?;
        if let serde_json::Value::Object(base) = &mut merged {
            base.extend(fields);
        }
        let config: Self = serde_json::from_value(merged)
            .with_context(|| format!("Invalid values in config file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the evaluator must never see
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.account_size.is_finite() && self.account_size > 0.0,
            "account size must be positive, got {}",
            self.account_size
        );
        check_pct("profit target", self.profit_target_pct)?;
        check_pct("max daily loss", self.max_daily_loss_pct)?;
        check_pct("max total loss", self.max_total_loss_pct)?;
        ensure!(self.trading_days > 0, "trading days must be at least 1");
        ensure!(
            self.mean_daily_return.is_finite(),
            "mean daily return must be finite, got {}",
            self.mean_daily_return
        );
        ensure!(
            self.daily_std_dev.is_finite() && self.daily_std_dev >= 0.0,
            "daily std dev must be >= 0, got {}",
            self.daily_std_dev
        );
        Ok(())
    }

    /// Dollar limits for this account
    pub fn limits(&self) -> ChallengeLimits {
        ChallengeLimits {
            account_size: self.account_size,
            profit_target: self.account_size * self.profit_target_pct / 100.0,
            max_daily_loss: self.account_size * self.max_daily_loss_pct / 100.0,
            max_total_loss: self.account_size * self.max_total_loss_pct / 100.0,
        }
    }
}

fn check_pct(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0 && value <= 100.0,
        "{} must be in (0, 100], got {}",
        name,
        value
    );
    Ok(())
}

/// Dollar amounts derived from a [`ChallengeConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChallengeLimits {
    pub account_size: f64,
    pub profit_target: f64,
    pub max_daily_loss: f64,
    pub max_total_loss: f64,
}

impl ChallengeLimits {
    /// Balance at which the challenge is passed
    pub fn target_balance(&self) -> f64 {
        self.account_size + self.profit_target
    }

    /// Max drawdown line; the account breaches once balance drops below it
    pub fn floor_balance(&self) -> f64 {
        self.account_size - self.max_total_loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = ChallengeConfig::default().limits();
        assert_eq!(limits.profit_target, 10_000.0);
        assert_eq!(limits.max_daily_loss, 5_000.0);
        assert_eq!(limits.max_total_loss, 10_000.0);
        assert_eq!(limits.target_balance(), 110_000.0);
        assert_eq!(limits.floor_balance(), 90_000.0);
    }

    #[test]
    fn test_presets() {
        let challenge = ChallengeConfig::ftmo(200_000.0);
        assert_eq!(challenge.limits().profit_target, 20_000.0);
        assert!(challenge.validate().is_ok());

        let verification = ChallengeConfig::ftmo_verification(50_000.0);
        assert_eq!(verification.trading_days, 60);
        assert_eq!(verification.limits().profit_target, 2_500.0);
        assert_eq!(verification.limits().max_daily_loss, 2_500.0);
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let bad = [
            ChallengeConfig { account_size: 0.0, ..Default::default() },
            ChallengeConfig { account_size: -5.0, ..Default::default() },
            ChallengeConfig { profit_target_pct: 0.0, ..Default::default() },
            ChallengeConfig { max_daily_loss_pct: 100.5, ..Default::default() },
            ChallengeConfig { max_total_loss_pct: f64::NAN, ..Default::default() },
            ChallengeConfig { trading_days: 0, ..Default::default() },
            ChallengeConfig { daily_std_dev: -1.0, ..Default::default() },
            ChallengeConfig { mean_daily_return: f64::INFINITY, ..Default::default() },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "accepted {:?}", config);
        }

        // 100% and zero std dev are both allowed
        let edge = ChallengeConfig {
            max_total_loss_pct: 100.0,
            daily_std_dev: 0.0,
            ..Default::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_validate_error_names_field() {
        let config = ChallengeConfig { trading_days: 0, ..Default::default() };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("trading days"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ChallengeConfig =
            serde_json::from_str(r#"{"account_size": 25000, "seed": 7}"#).unwrap();
        assert_eq!(config.account_size, 25_000.0);
        assert_eq!(config.seed, 7);
        assert_eq!(config.trading_days, 30);
        assert_eq!(config.max_daily_loss_pct, 5.0);
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!(
            "challenge_sim_config_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"trading_days": 45, "daily_std_dev": 800}"#).unwrap();
        let config = ChallengeConfig::from_json_file(&path).unwrap();
        assert_eq!(config.trading_days, 45);
        assert_eq!(config.daily_std_dev, 800.0);

        std::fs::write(&path, r#"{"trading_days": 0}"#).unwrap();
        assert!(ChallengeConfig::from_json_file(&path).is_err());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_json_file_overlays_preset() {
        let path = std::env::temp_dir().join(format!(
            "challenge_sim_overlay_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"seed": 7, "daily_std_dev": 900}"#).unwrap();

        let config = ChallengeConfig::ftmo_verification(50_000.0)
            .with_json_file(&path)
            .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.daily_std_dev, 900.0);
        // Preset values the file leaves out survive
        assert_eq!(config.trading_days, 60);
        assert_eq!(config.profit_target_pct, 5.0);
        assert_eq!(config.account_size, 50_000.0);

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(ChallengeConfig::default().with_json_file(&path).is_err());

        std::fs::remove_file(&path).ok();
    }
}
