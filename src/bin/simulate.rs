//! Monte Carlo simulation of a betting system at baccarat or roulette.
//!
//! Usage:
//!   cargo run --release --bin simulate -- baccarat [OPTIONS]
//!   cargo run --release --bin simulate -- roulette [OPTIONS]
//!
//! Flags override values from `--config`, which override the defaults.
//! Set `RUST_LOG=debug` for per-trial logging.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use betsim::games::baccarat::{Baccarat, BaccaratConfig, BaccaratStrategy, Side};
use betsim::games::roulette::{Roulette, RouletteBet, RouletteConfig, RouletteStrategy, Wheel};
use betsim::sim::{
    AbortReason, ConfigError, Game, HistoryDocument, RunFile, SimConfig, SimStats, Simulation,
    StakingPlan,
};

/// Table limit applied to baccarat runs when none is configured.
const BACCARAT_TABLE_LIMIT: i64 = 1_000;

/// Base stake for baccarat presets when `--bet` is not given.
const BACCARAT_UNIT: i64 = 100;

#[derive(Debug, Parser)]
#[command(name = "simulate", version, about = "Estimate betting system outcomes by Monte Carlo trial")]
struct Cli {
    #[command(subcommand)]
    game: GameCommand,
}

#[derive(Debug, Subcommand)]
enum GameCommand {
    /// Punto banco from a multi-deck shoe
    Baccarat(BaccaratArgs),
    /// Single- or double-zero wheel
    Roulette(RouletteArgs),
}

/// Options shared by every game.
#[derive(Debug, Args)]
struct RunArgs {
    /// Player name written to the history
    #[arg(long)]
    name: Option<String>,

    /// Base or unit stake for the strategy preset
    #[arg(long)]
    bet: Option<i64>,

    /// Starting balance
    #[arg(long)]
    balance: Option<i64>,

    /// Number of trials
    #[arg(long)]
    simulations: Option<u64>,

    /// Largest stake the table accepts
    #[arg(long)]
    tablelimit: Option<i64>,

    /// Profit goal per trial
    #[arg(long)]
    profit: Option<i64>,

    /// Stop a trial once the balance falls below this
    #[arg(long)]
    stoploss: Option<i64>,

    /// Run file with `sim`, `game` and `plan` sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the trial history
    #[arg(long, default_value = "game_history.json")]
    output: PathBuf,

    /// Run seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (default: all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Round cap per trial
    #[arg(long)]
    max_rounds: Option<u64>,

    /// Wall-clock budget per trial in milliseconds
    #[arg(long)]
    trial_deadline_ms: Option<u64>,

    /// Keep only trial summaries in the history, not every round
    #[arg(long)]
    no_history: bool,
}

impl RunArgs {
    fn load<C, B>(&self) -> Result<RunFile<C, B>, ConfigError>
    where
        C: serde::de::DeserializeOwned + Default,
        B: serde::de::DeserializeOwned,
    {
        match &self.config {
            Some(path) => {
                info!(path = %path.display(), "loading run file");
                RunFile::from_json_file(path)
            }
            None => Ok(RunFile {
                sim: SimConfig::default(),
                game: C::default(),
                plan: None,
            }),
        }
    }

    fn apply(&self, sim: &mut SimConfig) {
        if let Some(name) = &self.name {
            sim.player_name = name.clone();
        }
        if let Some(balance) = self.balance {
            sim.starting_balance = balance;
        }
        if let Some(trials) = self.simulations {
            sim.trials = trials;
        }
        if let Some(limit) = self.tablelimit {
            sim.table_limit = Some(limit);
        }
        if let Some(profit) = self.profit {
            sim.profit_goal = profit;
        }
        if let Some(floor) = self.stoploss {
            sim.stop_loss = floor;
        }
        if let Some(seed) = self.seed {
            sim.seed = Some(seed);
        }
        if let Some(threads) = self.threads {
            sim.threads = Some(threads);
        }
        if let Some(rounds) = self.max_rounds {
            sim.max_rounds = rounds;
        }
        if let Some(ms) = self.trial_deadline_ms {
            sim.trial_deadline_ms = Some(ms);
        }
        if self.no_history {
            sim.keep_history = false;
        }
    }
}

#[derive(Debug, Args)]
struct BaccaratArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Decks in the shoe
    #[arg(long)]
    decks: Option<u32>,

    /// Fraction of the stake paid on a Banker win
    #[arg(long)]
    house_edge: Option<f64>,

    /// Staking preset: type-switching, flat-player, flat-banker, fibonacci-banker
    #[arg(long)]
    strategy: Option<BaccaratStrategy>,
}

#[derive(Debug, Args)]
struct RouletteArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Use a single-zero wheel
    #[arg(long)]
    european: bool,

    /// Staking preset: thirds-progression, modified-martingale, fibonacci-12s, mixed-streets
    #[arg(long)]
    strategy: Option<RouletteStrategy>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid progress template: {0}")]
    Progress(#[from] indicatif::style::TemplateError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.game {
        GameCommand::Baccarat(args) => run_baccarat(args),
        GameCommand::Roulette(args) => run_roulette(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_baccarat(args: BaccaratArgs) -> Result<(), CliError> {
    let file: RunFile<BaccaratConfig, Side> = args.run.load()?;
    let mut sim = file.sim;
    args.run.apply(&mut sim);
    if sim.table_limit.is_none() {
        sim.table_limit = Some(BACCARAT_TABLE_LIMIT);
    }

    let mut table = file.game;
    if let Some(decks) = args.decks {
        table.decks = decks;
    }
    if let Some(payout) = args.house_edge {
        table.banker_payout = payout;
    }

    let plan = match (args.strategy, file.plan) {
        (None, Some(plan)) => plan,
        (preset, _) => {
            let preset = preset.unwrap_or(BaccaratStrategy::TypeSwitching);
            info!(strategy = %preset, "using preset");
            preset.plan(args.run.bet.unwrap_or(BACCARAT_UNIT))
        }
    };

    println!("=================================================");
    println!("  Baccarat Monte Carlo");
    println!("=================================================");
    println!("Decks: {}  Banker pays: {}", table.decks, table.banker_payout);
    simulate(Baccarat::new(table), sim, plan, &args.run.output)
}

fn run_roulette(args: RouletteArgs) -> Result<(), CliError> {
    let file: RunFile<RouletteConfig, RouletteBet> = args.run.load()?;
    let mut sim = file.sim;
    args.run.apply(&mut sim);

    let mut table = file.game;
    if args.european {
        table.wheel = Wheel::SingleZero;
    }

    let plan = match (args.strategy, file.plan) {
        (None, Some(plan)) => plan,
        (preset, _) => {
            let preset = preset.unwrap_or(RouletteStrategy::ThirdsProgression);
            info!(strategy = %preset, "using preset");
            table.pay_table = preset.pay_table();
            preset.plan(args.run.bet.unwrap_or_else(|| preset.default_unit()))
        }
    };

    println!("=================================================");
    println!("  Roulette Monte Carlo");
    println!("=================================================");
    println!("Wheel: {}", table.wheel);
    simulate(Roulette::new(table), sim, plan, &args.run.output)
}

fn simulate<G: Game>(
    game: G,
    sim: SimConfig,
    plan: StakingPlan<G::BetType>,
    output: &Path,
) -> Result<(), CliError> {
    println!("Player: {}", sim.player_name);
    println!(
        "Balance: {}  Profit goal: {}  Stop-loss: {}",
        sim.starting_balance, sim.profit_goal, sim.stop_loss
    );
    match sim.table_limit {
        Some(limit) => println!("Table limit: {}", limit),
        None => println!("Table limit: none"),
    }
    println!("Trials: {}", sim.trials);
    println!(
        "Threads: {}",
        sim.threads.map_or("auto".to_string(), |t| t.to_string())
    );
    println!();

    let bar = ProgressBar::new(sim.trials);
    bar.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} trials ({per_sec}, eta {eta})",
        )?
        .progress_chars("=> "),
    );

    let simulation = Simulation::new(game, sim, plan).with_observer(bar.clone());
    let report = simulation.run()?;
    bar.finish_and_clear();

    // Statistics stand on their own; a failed save is reported and ignored.
    let history = HistoryDocument::new(
        simulation.game().name(),
        report.seed,
        simulation.config().clone(),
        report.records,
    );
    match history.save_json(output) {
        Ok(()) => {
            info!(path = %output.display(), trials = history.trials.len(), "history saved");
            println!("Game history saved to {}", output.display());
        }
        Err(e) => {
            warn!(path = %output.display(), "failed to save history: {}", e);
            eprintln!("Error saving game history: {}", e);
        }
    }

    println!();
    print_stats(&report.stats, report.seed);
    Ok(())
}

fn print_stats(stats: &SimStats, seed: u64) {
    println!("=== Results ===");
    println!("Seed: {}", seed);
    println!(
        "Win rate after {} simulations: {:.2}% (± {:.2}%)",
        stats.trials,
        stats.win_rate * 100.0,
        stats.win_rate_std_dev * 100.0
    );
    println!("Loss rate: {:.2}%", stats.loss_rate * 100.0);
    println!("  Ruined:  {}", stats.ruined);
    println!("  Aborted: {}", stats.aborted);
    for reason in AbortReason::ALL {
        let count = stats.aborted_for(reason);
        if count > 0 {
            println!("    {:?}: {}", reason, count);
        }
    }
    if stats.failed > 0 {
        println!("  Failed:  {}", stats.failed);
    }
    println!("Average rounds per trial: {:.1}", stats.average_rounds);
    println!(
        "Elapsed: {:.2}s ({:.0} trials/s)",
        stats.elapsed_seconds, stats.trials_per_second
    );
}
