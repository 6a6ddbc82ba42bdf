//! Game implementations for the trial engine.
//!
//! Each game implements [`crate::sim::Game`]: it owns its outcome generator,
//! its round evaluator and the settlement of a single wager. The staking
//! logic, trial loop and aggregation live in [`crate::sim`] and are shared.
//!
//! ## Available Games
//!
//! - [`baccarat`]: punto banco from a multi-deck shoe, Player/Banker bets
//! - [`roulette`]: single- or double-zero wheel with range bets
//!
//! ## Adding New Games
//!
//! 1. Create a new module under `src/games/`
//! 2. Define the bet type, table state, outcome and history record
//! 3. Implement the `Game` trait
//! 4. Add tests for the evaluator and settlement
//!
//! See the [`roulette`] module for the smallest complete example.

pub mod baccarat;
pub mod roulette;
