//! Daily PnL generation
//!
//! Draws independent daily PnL values from a normal distribution using a
//! seeded RNG, so a given seed always produces the same sequence.

use anyhow::{anyhow, ensure, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::config::ChallengeConfig;

/// Seeded sampler for daily PnL in dollars
pub struct DailyPnlGenerator {
    dist: Normal<f64>,
    rng: StdRng,
}

impl DailyPnlGenerator {
    pub fn new(mean: f64, std_dev: f64, seed: u64) -> Result<Self> {
        ensure!(mean.is_finite(), "mean daily return must be finite, got {}", mean);
        ensure!(
            std_dev.is_finite() && std_dev >= 0.0,
            "daily std dev must be >= 0, got {}",
            std_dev
        );
        let dist = Normal::new(mean, std_dev)
            .map_err(|e| anyhow!("Invalid daily PnL distribution: {}", e))?;

        Ok(Self {
            dist,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn from_config(config: &ChallengeConfig) -> Result<Self> {
        Self::new(config.mean_daily_return, config.daily_std_dev, config.seed)
    }

    /// Draw the next `days` values
    pub fn sample_days(&mut self, days: usize) -> Vec<f64> {
        (0..days).map(|_| self.dist.sample(&mut self.rng)).collect()
    }
}

/// Full daily PnL sequence for a config (`trading_days` values)
pub fn generate_daily_pnls(config: &ChallengeConfig) -> Result<Vec<f64>> {
    let mut generator = DailyPnlGenerator::from_config(config)?;
    Ok(generator.sample_days(config.trading_days as usize))
}
