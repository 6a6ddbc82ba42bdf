//! Game trait definition for the trial engine.
//!
//! Any casino game that implements the `Game` trait can be driven by the
//! trial runner and the parallel simulation. This provides a clean
//! abstraction between the staking engine and the specific game rules.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::config::ConfigError;
use crate::sim::strategy::StakingPlan;

/// Trait for the categories of wager a game accepts.
///
/// Bet types are small closed enumerations, so they must be cheap to copy
/// and usable as map keys and in serialized history.
pub trait BetType:
    Copy + Eq + Hash + Debug + Display + Send + Sync + Serialize + DeserializeOwned + 'static
{
}

impl<T> BetType for T where
    T: Copy + Eq + Hash + Debug + Display + Send + Sync + Serialize + DeserializeOwned + 'static
{
}

/// Whether a single wager won or lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetResult {
    /// The wager's win condition was met.
    Win,
    /// Anything else, including a baccarat tie.
    Lose,
}

impl BetResult {
    /// True for [`BetResult::Win`].
    #[inline]
    pub fn is_win(self) -> bool {
        matches!(self, BetResult::Win)
    }
}

/// The effect of one wager on the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Win or lose.
    pub result: BetResult,
    /// Signed balance change in minor units (payout on a win, `-stake` on a loss).
    pub delta: i64,
}

impl Settlement {
    /// A winning settlement paying `payout` on top of the returned stake.
    pub fn win(payout: i64) -> Self {
        Self {
            result: BetResult::Win,
            delta: payout,
        }
    }

    /// A losing settlement forfeiting `stake`.
    pub fn lose(stake: i64) -> Self {
        Self {
            result: BetResult::Lose,
            delta: -stake,
        }
    }
}

/// Fatal failures while producing a round.
///
/// These indicate a broken invariant (for example a shoe that ran dry
/// because the reshuffle threshold was misconfigured), never a normal
/// game outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A card was requested from an empty shoe.
    #[error("no cards left in a {shoe_size}-card shoe")]
    ShoeExhausted {
        /// Total cards in a full shoe.
        shoe_size: usize,
    },
}

/// The main Game trait that defines the interface for any simulated game.
///
/// # Type Parameters
/// - `BetType`: the closed set of wagers the game accepts
/// - `Table`: per-trial mutable state (a shoe, or nothing for a wheel)
/// - `Outcome`: one evaluated round
/// - `Record`: the serializable summary of an outcome kept in trial history
///
/// # Example
/// ```ignore
/// struct MyGame;
///
/// impl Game for MyGame {
///     type BetType = MyBet;
///     type Table = ();
///     type Outcome = u8;
///     type Record = u8;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game: Send + Sync {
    /// The wagers this game accepts.
    type BetType: BetType;

    /// Mutable state owned by exactly one trial.
    type Table: Send;

    /// A raw outcome after the game's drawing rules have been applied.
    type Outcome: Debug;

    /// What gets written to the trial history for each round.
    type Record: Clone + Debug + PartialEq + Send + Serialize + DeserializeOwned;

    /// Short identifier used in logs and history documents.
    fn name(&self) -> &'static str;

    /// Create the per-trial table state.
    fn new_table<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Table;

    /// Produce and evaluate one round.
    ///
    /// # Errors
    /// Returns a [`GameError`] only when a precondition of the generator was
    /// violated; the affected trial must be abandoned.
    fn play_round<R: Rng + ?Sized>(
        &self,
        table: &mut Self::Table,
        rng: &mut R,
    ) -> Result<Self::Outcome, GameError>;

    /// Settle a single wager against an outcome.
    fn settle(&self, outcome: &Self::Outcome, bet: Self::BetType, stake: i64) -> Settlement;

    /// Summarize an outcome for the trial history.
    fn describe(&self, outcome: &Self::Outcome) -> Self::Record;

    /// Validate the game's own configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Check that a staking plan only uses bets this game can settle.
    fn validate_plan(&self, _plan: &StakingPlan<Self::BetType>) -> Result<(), ConfigError> {
        Ok(())
    }
}
