//! Betting strategies.
//!
//! A strategy is described by a [`StakingPlan`] (the configuration: which
//! bets, which stake table, which transition rule) and driven at run time
//! by a [`BettingStrategy`], a small state machine that reacts to the
//! previous round's win/loss results.
//!
//! Three plan shapes cover every supported system:
//! - **Flat**: fixed stakes, no state.
//! - **Progression**: each bet walks a shared stake table, advancing on a
//!   loss (wrapping at the end) and resetting on a win.
//! - **Type switching**: a single bet whose stake doubles on every loss
//!   while the bet type follows a fixed cycle; a win or a loss on the
//!   last cycle position resets everything.

use serde::{Deserialize, Serialize};

use crate::sim::config::ConfigError;
use crate::sim::game::{BetResult, BetType};

/// Multipliers of the Fibonacci-like progression.
pub const FIBONACCI_UNITS: [i64; 7] = [1, 1, 2, 3, 5, 8, 13];

/// A fixed wager in a flat plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatBet<B> {
    /// What to bet on.
    pub bet: B,
    /// How much, every round.
    pub stake: i64,
}

/// Configuration of a betting strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StakingPlan<B> {
    /// Fixed stakes every round regardless of outcome.
    Flat {
        /// Wagers placed each round.
        bets: Vec<FlatBet<B>>,
    },
    /// Per-bet step progression over a shared stake table.
    Progression {
        /// Bets played in parallel, each with its own step index.
        bets: Vec<B>,
        /// Stake for each step.
        steps: Vec<i64>,
    },
    /// Doubling with a bet-type cycle on consecutive losses.
    TypeSwitching {
        /// Stake after a reset.
        base: i64,
        /// Bet type after a reset.
        default: B,
        /// Bet type taken after the 1st, 2nd, ... consecutive loss.
        ///
        /// One more loss after the cycle is exhausted resets the strategy.
        cycle: Vec<B>,
    },
}

impl<B: BetType> StakingPlan<B> {
    /// Flat stakes on the given bets.
    pub fn flat(bets: impl IntoIterator<Item = (B, i64)>) -> Self {
        StakingPlan::Flat {
            bets: bets
                .into_iter()
                .map(|(bet, stake)| FlatBet { bet, stake })
                .collect(),
        }
    }

    /// Step progression over `steps` on each of `bets`.
    pub fn progression(bets: impl IntoIterator<Item = B>, steps: Vec<i64>) -> Self {
        StakingPlan::Progression {
            bets: bets.into_iter().collect(),
            steps,
        }
    }

    /// Fibonacci-like progression `unit × [1, 1, 2, 3, 5, 8, 13]`.
    pub fn fibonacci(bets: impl IntoIterator<Item = B>, unit: i64) -> Self {
        Self::progression(bets, FIBONACCI_UNITS.iter().map(|m| m * unit).collect())
    }

    /// Every bet type this plan can place.
    pub fn bet_types(&self) -> Vec<B> {
        match self {
            StakingPlan::Flat { bets } => bets.iter().map(|b| b.bet).collect(),
            StakingPlan::Progression { bets, .. } => bets.clone(),
            StakingPlan::TypeSwitching { default, cycle, .. } => {
                let mut types = vec![*default];
                types.extend(cycle.iter().copied());
                types
            }
        }
    }

    /// Number of wagers placed per round.
    pub fn num_legs(&self) -> usize {
        match self {
            StakingPlan::Flat { bets } => bets.len(),
            StakingPlan::Progression { bets, .. } => bets.len(),
            StakingPlan::TypeSwitching { .. } => 1,
        }
    }

    /// Validate the plan.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            StakingPlan::Flat { bets } => {
                if bets.is_empty() {
                    return Err(ConfigError::EmptyPlan("bet list"));
                }
                if let Some(bad) = bets.iter().find(|b| b.stake <= 0) {
                    return Err(ConfigError::InvalidStake(bad.stake));
                }
            }
            StakingPlan::Progression { bets, steps } => {
                if bets.is_empty() {
                    return Err(ConfigError::EmptyPlan("bet list"));
                }
                if steps.is_empty() {
                    return Err(ConfigError::EmptyPlan("step table"));
                }
                if let Some(&bad) = steps.iter().find(|&&s| s <= 0) {
                    return Err(ConfigError::InvalidStake(bad));
                }
            }
            StakingPlan::TypeSwitching { base, .. } => {
                if *base <= 0 {
                    return Err(ConfigError::InvalidStake(*base));
                }
            }
        }
        Ok(())
    }
}

/// One wager for the coming round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wager<B> {
    /// What is bet on.
    pub bet_type: B,
    /// Current stake.
    pub stake: i64,
    /// Position in the plan's progression (0 for flat plans).
    pub step: usize,
}

/// Run-time state machine for a [`StakingPlan`].
///
/// Owned by a single trial. `wagers` gives the stakes for the coming round,
/// `advance` feeds back that round's results.
#[derive(Debug, Clone)]
pub struct BettingStrategy<B> {
    plan: StakingPlan<B>,
    legs: Vec<Wager<B>>,
}

impl<B: BetType> BettingStrategy<B> {
    /// Start a strategy at its initial state.
    ///
    /// The plan is expected to have been validated.
    pub fn new(plan: StakingPlan<B>) -> Self {
        let legs = Self::initial_legs(&plan);
        Self { plan, legs }
    }

    fn initial_legs(plan: &StakingPlan<B>) -> Vec<Wager<B>> {
        match plan {
            StakingPlan::Flat { bets } => bets
                .iter()
                .map(|b| Wager {
                    bet_type: b.bet,
                    stake: b.stake,
                    step: 0,
                })
                .collect(),
            StakingPlan::Progression { bets, steps } => {
                let first = steps.first().copied().unwrap_or_default();
                bets.iter()
                    .map(|&bet_type| Wager {
                        bet_type,
                        stake: first,
                        step: 0,
                    })
                    .collect()
            }
            StakingPlan::TypeSwitching { base, default, .. } => vec![Wager {
                bet_type: *default,
                stake: *base,
                step: 0,
            }],
        }
    }

    /// Wagers for the coming round, clamped to the table limit.
    ///
    /// The clamp is stored: a doubling strategy keeps doubling from the
    /// clamped stake, as a player forced down to the limit would.
    pub fn wagers(&mut self, table_limit: Option<i64>) -> &[Wager<B>] {
        if let Some(limit) = table_limit {
            for leg in &mut self.legs {
                leg.stake = leg.stake.min(limit);
            }
        }
        &self.legs
    }

    /// Advance the state machine with the results of the last round.
    ///
    /// `results` holds one entry per wager, in the order `wagers` returned.
    pub fn advance(&mut self, results: &[BetResult]) {
        debug_assert_eq!(results.len(), self.legs.len(), "one result per wager");

        match &self.plan {
            StakingPlan::Flat { .. } => {}
            StakingPlan::Progression { steps, .. } => {
                for (leg, result) in self.legs.iter_mut().zip(results) {
                    leg.step = match result {
                        BetResult::Win => 0,
                        BetResult::Lose if leg.step + 1 < steps.len() => leg.step + 1,
                        BetResult::Lose => 0,
                    };
                    leg.stake = steps[leg.step];
                }
            }
            StakingPlan::TypeSwitching { base, default, cycle } => {
                let leg = &mut self.legs[0];
                let lost = results.first().map_or(false, |r| !r.is_win());
                if lost && leg.step < cycle.len() {
                    leg.stake = leg.stake.saturating_mul(2);
                    leg.bet_type = cycle[leg.step];
                    leg.step += 1;
                } else {
                    leg.stake = *base;
                    leg.bet_type = *default;
                    leg.step = 0;
                }
            }
        }
    }

    /// Current step index of a wager.
    pub fn step(&self, leg: usize) -> usize {
        self.legs[leg].step
    }

    /// Return to the initial state.
    pub fn reset(&mut self) {
        self.legs = Self::initial_legs(&self.plan);
    }

    /// The plan this strategy follows.
    pub fn plan(&self) -> &StakingPlan<B> {
        &self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    enum Side {
        Player,
        Banker,
    }

    impl fmt::Display for Side {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    use crate::sim::game::BetResult::{Lose, Win};

    #[test]
    fn test_progression_walks_and_resets() {
        let steps = vec![100, 100, 200, 300, 500, 800, 1300];
        let mut strategy = BettingStrategy::new(StakingPlan::progression([Side::Player], steps));

        let mut seen = Vec::new();
        for _ in 0..3 {
            let w = strategy.wagers(None)[0];
            seen.push((w.step, w.stake));
            strategy.advance(&[Lose]);
        }
        assert_eq!(seen, vec![(0, 100), (1, 100), (2, 200)]);
        assert_eq!(strategy.step(0), 3);
        assert_eq!(strategy.wagers(None)[0].stake, 300);

        strategy.advance(&[Win]);
        assert_eq!(strategy.step(0), 0);
        assert_eq!(strategy.wagers(None)[0].stake, 100);
    }

    #[test]
    fn test_progression_wraps_at_end_of_table() {
        let mut strategy =
            BettingStrategy::new(StakingPlan::progression([Side::Player], vec![25, 50, 150]));
        for _ in 0..3 {
            strategy.advance(&[Lose]);
            assert!(strategy.step(0) < 3);
        }
        assert_eq!(strategy.step(0), 0);
        assert_eq!(strategy.wagers(None)[0].stake, 25);
    }

    #[test]
    fn test_progression_legs_are_independent() {
        let mut strategy = BettingStrategy::new(StakingPlan::progression(
            [Side::Player, Side::Banker],
            vec![25, 50, 150],
        ));
        strategy.advance(&[Lose, Win]);
        strategy.advance(&[Lose, Lose]);
        assert_eq!(strategy.step(0), 2);
        assert_eq!(strategy.step(1), 1);
        let stakes: Vec<i64> = strategy.wagers(None).iter().map(|w| w.stake).collect();
        assert_eq!(stakes, vec![150, 50]);
    }

    #[test]
    fn test_fibonacci_table() {
        match StakingPlan::fibonacci([Side::Banker], 100) {
            StakingPlan::Progression { steps, .. } => {
                assert_eq!(steps, vec![100, 100, 200, 300, 500, 800, 1300]);
            }
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn test_flat_never_changes() {
        let mut strategy =
            BettingStrategy::new(StakingPlan::flat([(Side::Player, 100), (Side::Banker, 25)]));
        strategy.advance(&[Lose, Lose]);
        strategy.advance(&[Win, Lose]);
        let stakes: Vec<i64> = strategy.wagers(None).iter().map(|w| w.stake).collect();
        assert_eq!(stakes, vec![100, 25]);
    }

    fn switching() -> BettingStrategy<Side> {
        BettingStrategy::new(StakingPlan::TypeSwitching {
            base: 100,
            default: Side::Player,
            cycle: vec![Side::Banker, Side::Player, Side::Player, Side::Banker, Side::Banker],
        })
    }

    #[test]
    fn test_type_switching_cycle() {
        let mut strategy = switching();
        let mut seen = vec![];
        for _ in 0..7 {
            let w = strategy.wagers(None)[0];
            seen.push((w.bet_type, w.stake));
            strategy.advance(&[Lose]);
        }
        assert_eq!(
            seen,
            vec![
                (Side::Player, 100),
                (Side::Banker, 200),
                (Side::Player, 400),
                (Side::Player, 800),
                (Side::Banker, 1600),
                (Side::Banker, 3200),
                // sixth consecutive loss reset the cycle
                (Side::Player, 100),
            ]
        );
    }

    #[test]
    fn test_type_switching_resets_on_win() {
        let mut strategy = switching();
        strategy.advance(&[Lose]);
        strategy.advance(&[Lose]);
        strategy.advance(&[Win]);
        let w = strategy.wagers(None)[0];
        assert_eq!((w.bet_type, w.stake, w.step), (Side::Player, 100, 0));
    }

    #[test]
    fn test_table_limit_clamp_persists_for_doubling() {
        let mut strategy = switching();
        strategy.advance(&[Lose]);
        strategy.advance(&[Lose]);
        strategy.advance(&[Lose]);
        // 800 clamped to the 500 limit, then doubled from 500
        assert_eq!(strategy.wagers(Some(500))[0].stake, 500);
        strategy.advance(&[Lose]);
        assert_eq!(strategy.wagers(None)[0].stake, 1000);
    }

    #[test]
    fn test_validate_rejects_empty_and_non_positive() {
        assert_eq!(
            StakingPlan::<Side>::progression([], vec![1]).validate(),
            Err(ConfigError::EmptyPlan("bet list"))
        );
        assert_eq!(
            StakingPlan::progression([Side::Player], vec![]).validate(),
            Err(ConfigError::EmptyPlan("step table"))
        );
        assert_eq!(
            StakingPlan::flat([(Side::Player, 0)]).validate(),
            Err(ConfigError::InvalidStake(0))
        );
        assert!(StakingPlan::fibonacci([Side::Player], 100).validate().is_ok());
    }

    #[test]
    fn test_plan_json_shape() {
        let plan = StakingPlan::progression([Side::Banker], vec![25, 50]);
        let json = serde_json::to_string(&plan).unwrap();
        assert_eq!(json, r#"{"kind":"progression","bets":["Banker"],"steps":[25,50]}"#);
        let back: StakingPlan<Side> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }
}
