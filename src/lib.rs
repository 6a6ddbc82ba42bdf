//! # betsim
//!
//! A parallel Monte Carlo engine for estimating how fixed betting systems
//! fare at baccarat and roulette.
//!
//! Every trial starts from the same bankroll and plays round after round
//! under a deterministic staking rule until it reaches the profit goal, goes
//! broke, or can no longer place its bets. Many independent trials run in
//! parallel and are aggregated into a win rate, its standard deviation and
//! the average trial length.
//!
//! ## Features
//!
//! - **Generic engine**: any game implementing [`Game`] can be simulated
//! - **Three staking shapes**: flat, step progression and type switching
//! - **Per-trial RNG**: seeded runs are reproducible across thread counts
//! - **Safety bounds**: round cap, per-trial deadline and cancellation
//! - **History**: every round of every trial as one JSON document
//!
//! ## Quick Start
//!
//! ```ignore
//! use betsim::games::baccarat::{type_switching, Baccarat};
//! use betsim::sim::{SimConfig, Simulation};
//!
//! let config = SimConfig::default().with_trials(10_000).with_table_limit(5_000);
//! let sim = Simulation::new(Baccarat::default(), config, type_switching(100));
//! let report = sim.run()?;
//! println!("won {} of {}", report.stats.won, report.stats.trials);
//! ```
//!
//! ## Modules
//!
//! - [`sim`]: game abstraction, strategies, trial runner, orchestrator, stats, history
//! - [`games`]: baccarat and roulette
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Simulation (rayon pool)                      │
//! │  - Per-trial RNG streams   - Observer notifications             │
//! │  - Ordered fan-in          - Aggregate statistics               │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ TrialRunner + BettingStrategy
//!                               ▼
//!                ┌──────────────┴──────────────┐
//!                │                             │
//!                ▼                             ▼
//!         ┌────────────┐                ┌────────────┐
//!         │  Baccarat  │                │  Roulette  │
//!         │   (shoe)   │                │  (wheel)   │
//!         └────────────┘                └────────────┘
//! ```

#![warn(missing_docs)]

/// Game-independent trial engine.
///
/// Strategies, the trial state machine, the parallel orchestrator,
/// statistics and history persistence.
pub mod sim;

/// Game implementations module.
///
/// Contains baccarat and roulette.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use sim::{
    BetResult, BettingStrategy, ConfigError, Game, SimConfig, SimStats, Simulation,
    SimulationReport, StakingPlan, TrialRecord, TrialState,
};
