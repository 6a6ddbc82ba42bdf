//! Monte Carlo trial engine.
//!
//! This module provides the game-independent half of the simulator: the
//! `Game` abstraction, betting strategies, the single-trial state machine,
//! the parallel orchestrator, aggregate statistics and history persistence.
//!
//! # Overview
//!
//! ```text
//! Simulation ──par_iter──▶ TrialRunner ──▶ BettingStrategy (stakes)
//!     ▲                        │        ──▶ Game::play_round (outcome)
//!     │                        │        ──▶ Game::settle (balance delta)
//!     └──── TrialRecord ◀──────┘
//!            │
//!            ├──▶ SimStats        (win rate, std dev, average length)
//!            └──▶ HistoryDocument (JSON)
//! ```
//!
//! # Usage
//!
//! 1. Pick a game (see [`crate::games`]) and a [`StakingPlan`]
//! 2. Create a [`Simulation`] with a [`SimConfig`]
//! 3. Call `run()` and read [`SimStats`] from the report
//!
//! ```ignore
//! use betsim::games::roulette::{Roulette, RouletteBet};
//! use betsim::sim::{SimConfig, Simulation, StakingPlan};
//!
//! let plan = StakingPlan::fibonacci([RouletteBet::Third12], 100);
//! let sim = Simulation::new(Roulette::default(), SimConfig::default(), plan);
//! let report = sim.run()?;
//! println!("win rate {:.2}%", report.stats.win_rate * 100.0);
//! ```

pub mod config;
pub mod game;
pub mod history;
pub mod runner;
pub mod stats;
pub mod strategy;
pub mod trial;

// Re-export main types for convenient access
pub use config::{ConfigError, RunFile, SimConfig, DEFAULT_MAX_ROUNDS};
pub use game::{BetResult, BetType, Game, GameError, Settlement};
pub use history::{HistoryDocument, HistoryError};
pub use runner::{trial_rng, CancelToken, RecordOf, Simulation, SimulationReport, TrialObserver};
pub use stats::{population_std_dev, SimStats};
pub use strategy::{BettingStrategy, FlatBet, StakingPlan, Wager};
pub use trial::{
    AbortReason, RoundRecord, TrialError, TrialRecord, TrialRunner, TrialState, TrialSummary,
    WagerRecord,
};
