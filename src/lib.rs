// Library crate - challenge rules, PnL generation and batch simulation

pub mod config;
pub mod returns;
pub mod evaluator;
pub mod monte_carlo;
pub mod report;

// Re-export commonly used types
pub use config::{ChallengeConfig, ChallengeLimits};
pub use evaluator::{evaluate, Evaluation, LedgerEntry, Outcome};
pub use returns::{generate_daily_pnls, DailyPnlGenerator};
