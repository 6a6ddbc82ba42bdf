//! Parallel simulation orchestrator.
//!
//! Fans a run's trials out over a rayon worker pool, collects the finished
//! trial records and aggregates them into [`SimStats`].
//!
//! Every trial gets its own `ChaCha8Rng`: the run seed selects the key and
//! the trial index selects the ChaCha stream, so trials never share a
//! generator and a seeded run is reproducible regardless of scheduling.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use indicatif::ProgressBar;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, error, info};

use crate::sim::config::{ConfigError, SimConfig};
use crate::sim::game::Game;
use crate::sim::stats::SimStats;
use crate::sim::strategy::StakingPlan;
use crate::sim::trial::{TrialError, TrialRecord, TrialRunner, TrialSummary};

/// Trial record type produced for a game.
pub type RecordOf<G> = TrialRecord<<G as Game>::BetType, <G as Game>::Record>;

/// Run-wide cancellation signal.
///
/// Cloning shares the flag. In-flight trials observe it before every round
/// and close as aborted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal every holder to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether `cancel` has been called.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Notified once per finished trial, from whichever worker ran it.
///
/// Notification is fire-and-forget: implementations must not block, and
/// nothing they do feeds back into the run or its statistics.
pub trait TrialObserver: Send + Sync {
    /// A trial reached a terminal state.
    fn on_trial_complete(&self, summary: &TrialSummary);

    /// A trial was abandoned on a fatal error.
    fn on_trial_failed(&self, _error: &TrialError) {}
}

impl<F> TrialObserver for F
where
    F: Fn(&TrialSummary) + Send + Sync,
{
    fn on_trial_complete(&self, summary: &TrialSummary) {
        self(summary)
    }
}

impl TrialObserver for ProgressBar {
    fn on_trial_complete(&self, _summary: &TrialSummary) {
        self.inc(1);
    }

    fn on_trial_failed(&self, _error: &TrialError) {
        self.inc(1);
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct SimulationReport<G: Game> {
    /// Seed the run used (configured or drawn from entropy).
    pub seed: u64,
    /// Aggregate statistics.
    pub stats: SimStats,
    /// Completed trials in trial order.
    pub records: Vec<RecordOf<G>>,
    /// Trials abandoned on a fatal game error.
    pub failures: Vec<TrialError>,
}

/// The parallel trial engine.
///
/// # Example
/// ```ignore
/// let sim = Simulation::new(Roulette::default(), SimConfig::default(), plan);
/// let report = sim.run()?;
/// println!("win rate {:.2}%", report.stats.win_rate * 100.0);
/// ```
pub struct Simulation<G: Game> {
    game: G,
    config: SimConfig,
    plan: StakingPlan<G::BetType>,
    observer: Option<Arc<dyn TrialObserver>>,
    cancel: CancelToken,
}

impl<G: Game> Simulation<G> {
    /// Create a simulation for the given game, run config and staking plan.
    pub fn new(game: G, config: SimConfig, plan: StakingPlan<G::BetType>) -> Self {
        Self {
            game,
            config,
            plan,
            observer: None,
            cancel: CancelToken::new(),
        }
    }

    /// Attach an observer notified after each trial.
    pub fn with_observer(mut self, observer: impl TrialObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// A handle that cancels this simulation's in-flight trials.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Get reference to the game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Get reference to the staking plan.
    pub fn plan(&self) -> &StakingPlan<G::BetType> {
        &self.plan
    }

    /// Check run, game and plan configuration together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()?;
        self.game.validate()?;
        self.plan.validate()?;
        self.game.validate_plan(&self.plan)
    }

    /// Run every trial and aggregate the results.
    ///
    /// # Errors
    /// Fails only on invalid configuration, before any trial starts.
    /// Individual trial failures are reported in the result.
    pub fn run(&self) -> Result<SimulationReport<G>, ConfigError> {
        self.validate()?;

        let seed = self.config.seed.unwrap_or_else(rand::random);
        info!(
            game = self.game.name(),
            trials = self.config.trials,
            seed,
            "starting simulation"
        );

        let start = Instant::now();
        let outcomes = match self.config.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| ConfigError::ThreadPool(e.to_string()))?
                .install(|| self.run_trials(seed)),
            None => self.run_trials(seed),
        };

        let mut records = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(record) => records.push(record),
                Err(err) => {
                    error!(trial = err.trial, round = err.round, "trial abandoned: {}", err);
                    failures.push(err);
                }
            }
        }

        let mut stats = SimStats::from_summaries(
            records.iter().map(TrialRecord::summary),
            failures.len() as u64,
        );
        stats.update_rate(start.elapsed().as_secs_f64());

        info!(
            game = self.game.name(),
            won = stats.won,
            lost = stats.lost,
            failed = stats.failed,
            elapsed = stats.elapsed_seconds,
            "simulation finished"
        );

        Ok(SimulationReport {
            seed,
            stats,
            records,
            failures,
        })
    }

    fn run_trials(&self, seed: u64) -> Vec<Result<RecordOf<G>, TrialError>> {
        (0..self.config.trials)
            .into_par_iter()
            .map(|trial| self.run_trial(seed, trial))
            .collect()
    }

    /// Run a single trial on the calling thread.
    pub fn run_trial(&self, seed: u64, trial: u64) -> Result<RecordOf<G>, TrialError> {
        let mut rng = trial_rng(seed, trial);
        let result = TrialRunner::new(&self.game, &self.config, self.plan.clone(), trial, &mut rng)
            .with_cancel(self.cancel.clone())
            .run(&mut rng);

        match &result {
            Ok(record) => {
                debug!(
                    trial,
                    state = ?record.state,
                    rounds = record.rounds_played,
                    balance = record.final_balance,
                    "trial complete"
                );
                if let Some(observer) = &self.observer {
                    observer.on_trial_complete(&record.summary());
                }
            }
            Err(err) => {
                if let Some(observer) = &self.observer {
                    observer.on_trial_failed(err);
                }
            }
        }
        result
    }
}

impl<G: Game + fmt::Debug> fmt::Debug for Simulation<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("game", &self.game)
            .field("config", &self.config)
            .field("plan", &self.plan)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Generator for one trial: key from the run seed, stream from the trial index.
pub fn trial_rng(seed: u64, trial: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(trial);
    rng
}
