use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use challenge_sim::monte_carlo::{print_batch_results, simulate_batch};
use challenge_sim::report::{print_run, write_json, write_ledger_csv, RunReport};
use challenge_sim::{evaluate, generate_daily_pnls, ChallengeConfig};

#[derive(Parser, Debug)]
#[command(name = "challenge-sim")]
#[command(about = "Prop firm challenge Monte Carlo simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print verbose output (per-day trace)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate one challenge and print the trade log
    Run {
        #[command(flatten)]
        sim: SimArgs,

        /// Write the trade log as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the full run report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Run many challenges and report pass/breach rates
    Batch {
        #[command(flatten)]
        sim: SimArgs,

        /// Number of simulations
        #[arg(short = 'n', long, default_value = "10000")]
        simulations: usize,

        /// Write aggregate results as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Preset {
    /// 10% target, 5% daily loss, 10% total loss, 30 days
    Ftmo,
    /// 5% target, 5% daily loss, 10% total loss, 60 days
    Verification,
}

/// Challenge parameters. Flags win over the config file, the file wins over
/// the preset, and the preset wins over the built-in defaults.
#[derive(Args, Debug)]
struct SimArgs {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rule preset to start from
    #[arg(short, long, value_enum)]
    preset: Option<Preset>,

    /// Account size ($)
    #[arg(short, long)]
    account_size: Option<f64>,

    /// Profit target (%)
    #[arg(long)]
    profit_target_pct: Option<f64>,

    /// Max daily loss (%)
    #[arg(long)]
    max_daily_loss_pct: Option<f64>,

    /// Max total loss (%)
    #[arg(long)]
    max_total_loss_pct: Option<f64>,

    /// Trading days
    #[arg(short, long)]
    days: Option<u32>,

    /// Mean daily return ($)
    #[arg(short, long, allow_hyphen_values = true)]
    mean: Option<f64>,

    /// Daily return std dev ($)
    #[arg(short = 'S', long)]
    std_dev: Option<f64>,

    /// RNG seed
    #[arg(short, long, env = "CHALLENGE_SEED")]
    seed: Option<u64>,
}

impl SimArgs {
    fn into_config(self) -> Result<ChallengeConfig> {
        let mut config = match self.preset {
            Some(Preset::Ftmo) => ChallengeConfig::ftmo(100_000.0),
            Some(Preset::Verification) => ChallengeConfig::ftmo_verification(100_000.0),
            None => ChallengeConfig::default(),
        };
        if let Some(path) = &self.config {
            config = config.with_json_file(path)?;
        }

        if let Some(v) = self.account_size {
            config.account_size = v;
        }
        if let Some(v) = self.profit_target_pct {
            config.profit_target_pct = v;
        }
        if let Some(v) = self.max_daily_loss_pct {
            config.max_daily_loss_pct = v;
        }
        if let Some(v) = self.max_total_loss_pct {
            config.max_total_loss_pct = v;
        }
        if let Some(v) = self.days {
            config.trading_days = v;
        }
        if let Some(v) = self.mean {
            config.mean_daily_return = v;
        }
        if let Some(v) = self.std_dev {
            config.daily_std_dev = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run { sim, csv, json } => run_single(sim.into_config()?, csv, json),
        Commands::Batch { sim, simulations, json } => {
            run_batch(sim.into_config()?, simulations, json)
        }
    }
}

fn run_single(config: ChallengeConfig, csv: Option<PathBuf>, json: Option<PathBuf>) -> Result<()> {
    info!("=== SINGLE RUN ===");
    info!(
        "Account ${:.0}, {} days, daily PnL N({:.0}, {:.0}), seed {}",
        config.account_size,
        config.trading_days,
        config.mean_daily_return,
        config.daily_std_dev,
        config.seed
    );

    let pnls = generate_daily_pnls(&config)?;
    let evaluation = evaluate(&config, &pnls)?;
    let report = RunReport::new(&config, &evaluation);

    print_run(&report);

    if let Some(path) = csv {
        write_ledger_csv(&path, &evaluation)?;
    }
    if let Some(path) = json {
        write_json(&path, &report)?;
    }

    Ok(())
}

fn run_batch(config: ChallengeConfig, simulations: usize, json: Option<PathBuf>) -> Result<()> {
    info!("=== MONTE CARLO BATCH ===");

    let results = simulate_batch(&config, simulations)?;
    print_batch_results(&config, &results);

    if let Some(path) = json {
        write_json(&path, &results)?;
    }

    Ok(())
}
