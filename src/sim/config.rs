//! Configuration options for a simulation run.
//!
//! This module provides the run-level configuration shared by every game:
//! bankroll, profit goal, stop-loss, table limit, trial count and the
//! safety bounds that keep a misconfigured trial from running forever.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::strategy::StakingPlan;

/// Default cap on rounds per trial.
pub const DEFAULT_MAX_ROUNDS: u64 = 1_000_000;

/// Configuration for a simulation run.
///
/// All money amounts are in currency minor units.
///
/// # Example
/// ```
/// use betsim::sim::SimConfig;
///
/// let config = SimConfig::default().with_trials(1_000).with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Identifier written into the trial history.
    pub player_name: String,

    /// Balance every trial starts with.
    pub starting_balance: i64,

    /// A trial is won once the balance reaches `starting_balance + profit_goal`.
    pub profit_goal: i64,

    /// A trial stops as soon as the balance falls below this floor.
    ///
    /// Zero effectively disables the check.
    pub stop_loss: i64,

    /// Maximum stake the table accepts. Larger stakes are clamped to it.
    pub table_limit: Option<i64>,

    /// Number of independent trials to run.
    pub trials: u64,

    /// Safety bound on rounds per trial.
    ///
    /// A trial reaching it is closed as aborted, separately from ruin.
    pub max_rounds: u64,

    /// Wall-clock budget per trial in milliseconds.
    pub trial_deadline_ms: Option<u64>,

    /// Worker threads. `None` uses all available cores.
    pub threads: Option<usize>,

    /// Run seed. Each trial derives its own stream from it.
    ///
    /// If `None`, a seed is drawn from OS entropy for every run.
    pub seed: Option<u64>,

    /// Keep every round of every trial for the history document.
    ///
    /// Trial summaries are always kept.
    pub keep_history: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            starting_balance: 5_000,
            profit_goal: 1_000,
            stop_loss: 0,
            table_limit: None,
            trials: 10_000,
            max_rounds: DEFAULT_MAX_ROUNDS,
            trial_deadline_ms: None,
            threads: None,
            seed: None,
            keep_history: true,
        }
    }
}

impl SimConfig {
    /// Create a new SimConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance at which a trial counts as won.
    #[inline]
    pub fn target_balance(&self) -> i64 {
        self.starting_balance.saturating_add(self.profit_goal)
    }

    /// Builder method: set the run identifier.
    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    /// Builder method: set the starting balance.
    pub fn with_starting_balance(mut self, balance: i64) -> Self {
        self.starting_balance = balance;
        self
    }

    /// Builder method: set the profit goal.
    pub fn with_profit_goal(mut self, goal: i64) -> Self {
        self.profit_goal = goal;
        self
    }

    /// Builder method: set the stop-loss floor.
    pub fn with_stop_loss(mut self, floor: i64) -> Self {
        self.stop_loss = floor;
        self
    }

    /// Builder method: set the table limit.
    pub fn with_table_limit(mut self, limit: i64) -> Self {
        self.table_limit = Some(limit);
        self
    }

    /// Builder method: set the number of trials.
    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    /// Builder method: set the per-trial round cap.
    pub fn with_max_rounds(mut self, rounds: u64) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Builder method: set the per-trial deadline.
    pub fn with_trial_deadline_ms(mut self, ms: u64) -> Self {
        self.trial_deadline_ms = Some(ms);
        self
    }

    /// Builder method: set number of threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: keep or drop per-round history.
    pub fn with_history(mut self, keep: bool) -> Self {
        self.keep_history = keep;
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        if self.starting_balance <= 0 {
            return Err(ConfigError::NonPositive("starting balance", self.starting_balance));
        }
        if self.profit_goal <= 0 {
            return Err(ConfigError::NonPositive("profit goal", self.profit_goal));
        }
        if self.starting_balance.checked_add(self.profit_goal).is_none() {
            return Err(ConfigError::TargetOverflow {
                balance: self.starting_balance,
                profit_goal: self.profit_goal,
            });
        }
        if self.stop_loss < 0 {
            return Err(ConfigError::NegativeStopLoss(self.stop_loss));
        }
        if self.stop_loss > self.starting_balance {
            return Err(ConfigError::StopLossAboveBalance {
                stop_loss: self.stop_loss,
                balance: self.starting_balance,
            });
        }
        if let Some(limit) = self.table_limit {
            if limit <= 0 {
                return Err(ConfigError::NonPositive("table limit", limit));
            }
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::ZeroMaxRounds);
        }
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// A complete run description loaded from one JSON file.
///
/// ```json
/// {
///   "sim": { "starting_balance": 25000, "profit_goal": 5000, "trials": 100000 },
///   "game": { "wheel": "single_zero" },
///   "plan": { "kind": "progression", "bets": ["Third12"], "steps": [100, 100, 200] }
/// }
/// ```
///
/// Every section is optional. A missing `plan` leaves the choice to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "C: Serialize, B: Serialize",
    deserialize = "C: Deserialize<'de> + Default, B: Deserialize<'de>"
))]
pub struct RunFile<C, B> {
    /// Run configuration.
    #[serde(default)]
    pub sim: SimConfig,
    /// Game configuration.
    #[serde(default)]
    pub game: C,
    /// Staking plan.
    #[serde(default)]
    pub plan: Option<StakingPlan<B>>,
}

impl<C, B> RunFile<C, B>
where
    C: DeserializeOwned + Default,
    B: DeserializeOwned,
{
    /// Load a run file. Only the JSON shape is checked here; validation
    /// happens when the run starts.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse a run file from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Errors that can occur when validating a run configuration.
///
/// Any of these is raised before the first trial starts; no partial run
/// is ever attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Trial count is zero.
    #[error("trial count must be at least 1")]
    ZeroTrials,
    /// An amount that must be positive is not.
    #[error("{0} must be positive, got {1}")]
    NonPositive(&'static str, i64),
    /// Starting balance plus profit goal does not fit in an `i64`.
    #[error("target balance {balance} + {profit_goal} overflows")]
    TargetOverflow {
        /// Configured starting balance.
        balance: i64,
        /// Configured profit goal.
        profit_goal: i64,
    },
    /// Stop-loss floor is negative.
    #[error("stop-loss {0} must not be negative")]
    NegativeStopLoss(i64),
    /// Stop-loss floor is above the starting balance.
    #[error("stop-loss {stop_loss} is above the starting balance {balance}")]
    StopLossAboveBalance {
        /// Configured floor.
        stop_loss: i64,
        /// Configured starting balance.
        balance: i64,
    },
    /// Round cap is zero.
    #[error("max rounds per trial must be at least 1")]
    ZeroMaxRounds,
    /// Thread count is zero.
    #[error("thread count must be at least 1")]
    ZeroThreads,
    /// A staking plan has no bets or no steps.
    #[error("staking plan has an empty {0}")]
    EmptyPlan(&'static str),
    /// A stake in a staking plan is not positive.
    #[error("stake {0} in staking plan must be positive")]
    InvalidStake(i64),
    /// Shoe has no decks.
    #[error("shoe needs at least one deck")]
    ZeroDecks,
    /// Reshuffle threshold cannot guarantee a full round or never triggers.
    #[error("reshuffle threshold {threshold} must be between {min} and {max}")]
    ReshuffleThreshold {
        /// Configured threshold.
        threshold: usize,
        /// Cards one round can consume.
        min: usize,
        /// Largest usable threshold (one below the shoe size).
        max: usize,
    },
    /// Banker payout factor outside (0, 1].
    #[error("banker payout factor {0} is out of range (0, 1]")]
    BankerPayout(f64),
    /// A roulette coverage range or multiplier is invalid.
    #[error("invalid coverage for {bet}: {reason}")]
    InvalidCoverage {
        /// Bet name.
        bet: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A plan uses a bet the pay table does not know.
    #[error("bet {0} has no pay table entry")]
    UnknownBet(String),
    /// The worker pool could not be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    Io(String),
    /// Parsing a config file failed.
    #[error("failed to parse config: {0}")]
    Parse(String),
}
