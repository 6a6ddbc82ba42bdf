//! Single-trial runner.
//!
//! A trial plays rounds of one game under one betting strategy, starting
//! from the configured balance, until it reaches the profit target, is
//! ruined, or is aborted (stake above balance, stop-loss, round cap,
//! deadline or cancellation). Every trial owns its table state, strategy
//! and random number generator; nothing is shared with other trials.

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::config::SimConfig;
use crate::sim::game::{BetResult, Game, GameError};
use crate::sim::runner::CancelToken;
use crate::sim::strategy::{BettingStrategy, StakingPlan};

/// How many rounds pass between deadline checks.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Why a trial stopped without reaching the target or going broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// A required stake was larger than the remaining balance.
    StakeExceedsBalance,
    /// The balance fell below the stop-loss floor.
    StopLoss,
    /// The per-trial round cap was hit.
    RoundCap,
    /// The per-trial deadline passed.
    Deadline,
    /// The run was cancelled.
    Cancelled,
}

impl AbortReason {
    /// All reasons, in reporting order.
    pub const ALL: [AbortReason; 5] = [
        AbortReason::StakeExceedsBalance,
        AbortReason::StopLoss,
        AbortReason::RoundCap,
        AbortReason::Deadline,
        AbortReason::Cancelled,
    ];
}

/// Trial state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialState {
    /// Still playing.
    Running,
    /// Balance reached `starting_balance + profit_goal`.
    WonTarget,
    /// Balance reached zero or below.
    Ruined,
    /// Stopped for another reason.
    Aborted(AbortReason),
}

impl TrialState {
    /// True for every state but `Running`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, TrialState::Running)
    }

    /// True only for `WonTarget`.
    #[inline]
    pub fn is_won(self) -> bool {
        matches!(self, TrialState::WonTarget)
    }
}

/// One settled wager inside a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WagerRecord<B> {
    /// What was bet on.
    pub bet_type: B,
    /// Stake after any table-limit clamp.
    pub stake: i64,
    /// Strategy step the stake came from.
    pub step: usize,
    /// Win or lose.
    pub result: BetResult,
    /// Balance change from this wager.
    pub delta: i64,
}

/// One played round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord<B, O> {
    /// 1-based round number within the trial.
    pub round: u64,
    /// Wagers placed this round.
    pub wagers: Vec<WagerRecord<B>>,
    /// What the table produced (hand values and winner, or pocket).
    pub outcome: O,
    /// Balance after settling every wager.
    pub balance: i64,
}

impl<B, O> RoundRecord<B, O> {
    /// Net balance change of the round.
    pub fn delta(&self) -> i64 {
        self.wagers.iter().fold(0i64, |acc, w| acc.saturating_add(w.delta))
    }
}

/// The full record of a finished trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord<B, O> {
    /// Trial index within the run.
    pub trial: u64,
    /// Terminal state; never `Running` once returned by the runner.
    pub state: TrialState,
    /// Balance at the start.
    pub starting_balance: i64,
    /// Balance at the end.
    pub final_balance: i64,
    /// Number of rounds actually played.
    pub rounds_played: u64,
    /// Per-round history. Empty when history retention is off.
    pub rounds: Vec<RoundRecord<B, O>>,
}

impl<B, O> TrialRecord<B, O> {
    /// Balances after each round, recomputed from the recorded deltas.
    pub fn replay_balances(&self) -> Vec<i64> {
        self.rounds
            .iter()
            .scan(self.starting_balance, |balance, round| {
                *balance = balance.saturating_add(round.delta());
                Some(*balance)
            })
            .collect()
    }

    /// Check that the recorded balances match a replay of the deltas.
    ///
    /// Only meaningful when history was kept.
    pub fn accounting_is_consistent(&self) -> bool {
        let replayed = self.replay_balances();
        let per_round = replayed
            .iter()
            .zip(&self.rounds)
            .all(|(&b, round)| b == round.balance);
        let terminal = replayed.last().copied().unwrap_or(self.starting_balance);
        per_round && terminal == self.final_balance
    }

    /// Summary without the round history.
    pub fn summary(&self) -> TrialSummary {
        TrialSummary {
            trial: self.trial,
            state: self.state,
            final_balance: self.final_balance,
            rounds_played: self.rounds_played,
        }
    }
}

/// Compact trial result handed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSummary {
    /// Trial index within the run.
    pub trial: u64,
    /// Terminal state.
    pub state: TrialState,
    /// Balance at the end.
    pub final_balance: i64,
    /// Number of rounds played.
    pub rounds_played: u64,
}

/// A trial that had to be abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("trial {trial} failed in round {round}: {source}")]
pub struct TrialError {
    /// Trial index within the run.
    pub trial: u64,
    /// Round being played when the failure happened.
    pub round: u64,
    /// Underlying game failure.
    #[source]
    pub source: GameError,
}

/// Drives one trial round by round.
///
/// # Example
/// ```ignore
/// let runner = TrialRunner::new(&game, &config, plan.clone(), 0, &mut rng);
/// let record = runner.run(&mut rng)?;
/// assert!(record.state.is_terminal());
/// ```
pub struct TrialRunner<'a, G: Game> {
    game: &'a G,
    config: &'a SimConfig,
    trial: u64,
    table: G::Table,
    strategy: BettingStrategy<G::BetType>,
    balance: i64,
    state: TrialState,
    rounds_played: u64,
    rounds: Vec<RoundRecord<G::BetType, G::Record>>,
    results: Vec<BetResult>,
    cancel: Option<CancelToken>,
    deadline: Option<Instant>,
}

impl<'a, G: Game> TrialRunner<'a, G> {
    /// Start a trial in the `Running` state.
    pub fn new<R: Rng + ?Sized>(
        game: &'a G,
        config: &'a SimConfig,
        plan: StakingPlan<G::BetType>,
        trial: u64,
        rng: &mut R,
    ) -> Self {
        let legs = plan.num_legs();
        Self {
            game,
            config,
            trial,
            table: game.new_table(rng),
            strategy: BettingStrategy::new(plan),
            balance: config.starting_balance,
            state: TrialState::Running,
            rounds_played: 0,
            rounds: Vec::new(),
            results: Vec::with_capacity(legs),
            cancel: None,
            deadline: config
                .trial_deadline_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
        }
    }

    /// Observe a run-wide cancellation signal.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Current state.
    pub fn state(&self) -> TrialState {
        self.state
    }

    /// Current balance.
    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Rounds played so far.
    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    /// The strategy's current state.
    pub fn strategy(&self) -> &BettingStrategy<G::BetType> {
        &self.strategy
    }

    fn abort_reason(&mut self) -> Option<AbortReason> {
        if self.rounds_played >= self.config.max_rounds {
            return Some(AbortReason::RoundCap);
        }
        if self.cancel.as_ref().map_or(false, CancelToken::is_cancelled) {
            return Some(AbortReason::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if self.rounds_played % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                return Some(AbortReason::Deadline);
            }
        }
        if self.balance < self.config.stop_loss {
            return Some(AbortReason::StopLoss);
        }
        let balance = self.balance;
        let wagers = self.strategy.wagers(self.config.table_limit);
        if wagers.iter().any(|w| w.stake > balance) {
            return Some(AbortReason::StakeExceedsBalance);
        }
        None
    }

    /// Play one round, or close the trial if it cannot continue.
    ///
    /// Returns the state after the step. Calling `step` on a finished trial
    /// is a no-op.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<TrialState, TrialError> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        if let Some(reason) = self.abort_reason() {
            self.state = TrialState::Aborted(reason);
            return Ok(self.state);
        }

        let outcome = self
            .game
            .play_round(&mut self.table, rng)
            .map_err(|source| TrialError {
                trial: self.trial,
                round: self.rounds_played + 1,
                source,
            })?;

        // Stakes were clamped in `abort_reason`; no further limit applies.
        let wagers = self.strategy.wagers(None);
        let mut records = Vec::with_capacity(if self.config.keep_history { wagers.len() } else { 0 });
        self.results.clear();
        for wager in wagers {
            let settlement = self.game.settle(&outcome, wager.bet_type, wager.stake);
            self.balance = self.balance.saturating_add(settlement.delta);
            self.results.push(settlement.result);
            if self.config.keep_history {
                records.push(WagerRecord {
                    bet_type: wager.bet_type,
                    stake: wager.stake,
                    step: wager.step,
                    result: settlement.result,
                    delta: settlement.delta,
                });
            }
        }
        self.rounds_played += 1;

        if self.config.keep_history {
            self.rounds.push(RoundRecord {
                round: self.rounds_played,
                wagers: records,
                outcome: self.game.describe(&outcome),
                balance: self.balance,
            });
        }

        self.strategy.advance(&self.results);

        if self.balance >= self.config.target_balance() {
            self.state = TrialState::WonTarget;
        } else if self.balance <= 0 {
            self.state = TrialState::Ruined;
        }
        Ok(self.state)
    }

    /// Play until a terminal state and close the record.
    pub fn run<R: Rng + ?Sized>(
        mut self,
        rng: &mut R,
    ) -> Result<TrialRecord<G::BetType, G::Record>, TrialError> {
        while !self.step(rng)?.is_terminal() {}
        Ok(self.finish())
    }

    /// Close the record. The state must already be terminal.
    fn finish(self) -> TrialRecord<G::BetType, G::Record> {
        debug_assert!(self.state.is_terminal());
        TrialRecord {
            trial: self.trial,
            state: self.state,
            starting_balance: self.config.starting_balance,
            final_balance: self.balance,
            rounds_played: self.rounds_played,
            rounds: self.rounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::game::Settlement;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::fmt;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    struct Coin;

    impl fmt::Display for Coin {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Coin")
        }
    }

    /// Even-money coin that lands on a scripted sequence.
    struct ScriptedCoin {
        flips: Vec<bool>,
    }

    impl Game for ScriptedCoin {
        type BetType = Coin;
        type Table = usize;
        type Outcome = bool;
        type Record = bool;

        fn name(&self) -> &'static str {
            "coin"
        }

        fn new_table<R: Rng + ?Sized>(&self, _rng: &mut R) -> usize {
            0
        }

        fn play_round<R: Rng + ?Sized>(
            &self,
            table: &mut usize,
            _rng: &mut R,
        ) -> Result<bool, GameError> {
            let flip = self.flips[*table % self.flips.len()];
            *table += 1;
            Ok(flip)
        }

        fn settle(&self, outcome: &bool, _bet: Coin, stake: i64) -> Settlement {
            if *outcome {
                Settlement::win(stake)
            } else {
                Settlement::lose(stake)
            }
        }

        fn describe(&self, outcome: &bool) -> bool {
            *outcome
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn run(game: &ScriptedCoin, config: &SimConfig, plan: StakingPlan<Coin>) -> TrialRecord<Coin, bool> {
        let mut rng = rng();
        TrialRunner::new(game, config, plan, 0, &mut rng)
            .run(&mut rng)
            .unwrap()
    }

    #[test]
    fn test_reaches_target() {
        let game = ScriptedCoin { flips: vec![true] };
        let config = SimConfig::default()
            .with_starting_balance(1_000)
            .with_profit_goal(300);
        let record = run(&game, &config, StakingPlan::flat([(Coin, 100)]));

        assert_eq!(record.state, TrialState::WonTarget);
        assert_eq!(record.final_balance, 1_300);
        assert_eq!(record.rounds_played, 3);
        assert!(record.accounting_is_consistent());
    }

    #[test]
    fn test_ruin() {
        let game = ScriptedCoin { flips: vec![false] };
        let config = SimConfig::default()
            .with_starting_balance(300)
            .with_profit_goal(100);
        let record = run(&game, &config, StakingPlan::flat([(Coin, 100)]));

        assert_eq!(record.state, TrialState::Ruined);
        assert_eq!(record.final_balance, 0);
        assert_eq!(record.rounds_played, 3);
        assert_eq!(record.replay_balances(), vec![200, 100, 0]);
    }

    #[test]
    fn test_stake_above_balance_aborts() {
        let game = ScriptedCoin { flips: vec![false] };
        let config = SimConfig::default()
            .with_starting_balance(250)
            .with_profit_goal(100);
        let record = run(&game, &config, StakingPlan::flat([(Coin, 100)]));

        assert_eq!(record.state, TrialState::Aborted(AbortReason::StakeExceedsBalance));
        assert_eq!(record.final_balance, 50);
        assert!(record.accounting_is_consistent());
    }

    #[test]
    fn test_stop_loss_aborts() {
        let game = ScriptedCoin { flips: vec![false] };
        let config = SimConfig::default()
            .with_starting_balance(1_000)
            .with_profit_goal(100)
            .with_stop_loss(750);
        let record = run(&game, &config, StakingPlan::flat([(Coin, 100)]));

        assert_eq!(record.state, TrialState::Aborted(AbortReason::StopLoss));
        assert_eq!(record.final_balance, 700);
    }

    #[test]
    fn test_round_cap_bounds_a_stalled_trial() {
        // Alternating flips never move the balance off its start.
        let game = ScriptedCoin { flips: vec![true, false] };
        let config = SimConfig::default()
            .with_starting_balance(1_000)
            .with_profit_goal(500)
            .with_max_rounds(11);
        let record = run(&game, &config, StakingPlan::flat([(Coin, 100)]));

        assert_eq!(record.state, TrialState::Aborted(AbortReason::RoundCap));
        assert_eq!(record.rounds_played, 11);
        assert_eq!(record.final_balance, 1_100);
    }

    #[test]
    fn test_table_limit_clamps_stake() {
        let game = ScriptedCoin { flips: vec![false, false, true] };
        let config = SimConfig::default()
            .with_starting_balance(10_000)
            .with_profit_goal(500)
            .with_table_limit(150)
            .with_max_rounds(3);
        let plan = StakingPlan::progression([Coin], vec![100, 200, 400]);
        let record = run(&game, &config, plan);

        let stakes: Vec<i64> = record.rounds.iter().map(|r| r.wagers[0].stake).collect();
        assert_eq!(stakes, vec![100, 150, 150]);
        assert_eq!(record.final_balance, 9_900);
        assert_eq!(record.state, TrialState::Aborted(AbortReason::RoundCap));
    }

    #[test]
    fn test_cancelled_before_first_round() {
        let game = ScriptedCoin { flips: vec![true] };
        let config = SimConfig::default();
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut rng = rng();
        let record = TrialRunner::new(&game, &config, StakingPlan::flat([(Coin, 100)]), 3, &mut rng)
            .with_cancel(cancel)
            .run(&mut rng)
            .unwrap();

        assert_eq!(record.state, TrialState::Aborted(AbortReason::Cancelled));
        assert_eq!(record.rounds_played, 0);
        assert_eq!(record.trial, 3);
    }

    #[test]
    fn test_deadline_closes_trial() {
        let game = ScriptedCoin { flips: vec![true] };
        let config = SimConfig::default().with_trial_deadline_ms(0);
        let mut rng = rng();
        let record = TrialRunner::new(&game, &config, StakingPlan::flat([(Coin, 100)]), 0, &mut rng)
            .run(&mut rng)
            .unwrap();

        assert_eq!(record.state, TrialState::Aborted(AbortReason::Deadline));
        assert_eq!(record.rounds_played, 0);
        assert_eq!(record.final_balance, config.starting_balance);
    }

    #[test]
    fn test_huge_balance_saturates() {
        let game = ScriptedCoin { flips: vec![true] };
        let config = SimConfig::default()
            .with_starting_balance(i64::MAX - 1_000)
            .with_profit_goal(1_000);
        let record = run(&game, &config, StakingPlan::flat([(Coin, i64::MAX - 2_000)]));

        assert_eq!(record.state, TrialState::WonTarget);
        assert_eq!(record.final_balance, i64::MAX);
        assert_eq!(record.rounds_played, 1);
    }

    #[test]
    fn test_history_can_be_dropped() {
        let game = ScriptedCoin { flips: vec![true] };
        let config = SimConfig::default()
            .with_starting_balance(1_000)
            .with_profit_goal(300)
            .with_history(false);
        let record = run(&game, &config, StakingPlan::flat([(Coin, 100)]));

        assert!(record.rounds.is_empty());
        assert_eq!(record.rounds_played, 3);
        assert_eq!(record.final_balance, 1_300);
    }

    #[test]
    fn test_step_after_terminal_is_noop() {
        let game = ScriptedCoin { flips: vec![true] };
        let config = SimConfig::default()
            .with_starting_balance(1_000)
            .with_profit_goal(100);
        let mut rng = rng();
        let mut runner = TrialRunner::new(&game, &config, StakingPlan::flat([(Coin, 100)]), 0, &mut rng);

        assert_eq!(runner.step(&mut rng).unwrap(), TrialState::WonTarget);
        assert_eq!(runner.step(&mut rng).unwrap(), TrialState::WonTarget);
        assert_eq!(runner.rounds_played(), 1);
        assert_eq!(runner.balance(), 1_100);
    }
}
