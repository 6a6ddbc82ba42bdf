//! Roulette as a simulated game.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::bets::{PayTable, RouletteBet};
use super::wheel::{Pocket, Wheel};
use crate::sim::config::ConfigError;
use crate::sim::game::{Game, GameError, Settlement};
use crate::sim::strategy::StakingPlan;

/// Step multipliers of the thirds progression (25, 50, 150, 450, 850, 1350 at unit 25).
pub const THIRDS_STEPS: [i64; 6] = [1, 2, 6, 18, 34, 54];

/// Step multipliers of the modified martingale (25, 50, 150, 450, 850 at unit 25).
pub const MARTINGALE_STEPS: [i64; 5] = [1, 2, 6, 18, 34];

/// Wheel and pay table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouletteConfig {
    /// Single or double zero.
    pub wheel: Wheel,
    /// Coverage and multiplier per bet type.
    pub pay_table: PayTable,
}

impl Default for RouletteConfig {
    fn default() -> Self {
        Self {
            wheel: Wheel::DoubleZero,
            pay_table: PayTable::split_dozens(),
        }
    }
}

impl RouletteConfig {
    /// Builder method: set the wheel.
    pub fn with_wheel(mut self, wheel: Wheel) -> Self {
        self.wheel = wheel;
        self
    }

    /// Builder method: set the pay table.
    pub fn with_pay_table(mut self, pay_table: PayTable) -> Self {
        self.pay_table = pay_table;
        self
    }
}

/// Roulette with a configurable wheel and pay table. Spins are stateless.
#[derive(Debug, Clone, Default)]
pub struct Roulette {
    config: RouletteConfig,
}

impl Roulette {
    /// Create a table with the given configuration.
    pub fn new(config: RouletteConfig) -> Self {
        Self { config }
    }

    /// The table configuration.
    pub fn config(&self) -> &RouletteConfig {
        &self.config
    }
}

impl Game for Roulette {
    type BetType = RouletteBet;
    type Table = ();
    type Outcome = Pocket;
    type Record = Pocket;

    fn name(&self) -> &'static str {
        "roulette"
    }

    fn new_table<R: Rng + ?Sized>(&self, _rng: &mut R) {}

    fn play_round<R: Rng + ?Sized>(&self, _table: &mut (), rng: &mut R) -> Result<Pocket, GameError> {
        Ok(self.config.wheel.spin(rng))
    }

    fn settle(&self, pocket: &Pocket, bet: RouletteBet, stake: i64) -> Settlement {
        self.config.pay_table.settle(*pocket, bet, stake)
    }

    fn describe(&self, pocket: &Pocket) -> Pocket {
        *pocket
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.config.pay_table.validate()
    }

    fn validate_plan(&self, plan: &StakingPlan<RouletteBet>) -> Result<(), ConfigError> {
        match plan
            .bet_types()
            .into_iter()
            .find(|bet| !self.config.pay_table.contains(*bet))
        {
            Some(bet) => Err(ConfigError::UnknownBet(bet.to_string())),
            None => Ok(()),
        }
    }
}

/// Named roulette staking systems, each paired with the pay table it was
/// designed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouletteStrategy {
    /// Second12 and Third12 each walking a six-step table.
    ThirdsProgression,
    /// Second12 and Third12 each walking a five-step table.
    ModifiedMartingale,
    /// Fibonacci-like progression on Third12 with dozens paying 3.
    Fibonacci12s,
    /// Flat stakes on both twelves and two streets.
    MixedStreets,
}

impl RouletteStrategy {
    /// Every preset.
    pub const ALL: [RouletteStrategy; 4] = [
        RouletteStrategy::ThirdsProgression,
        RouletteStrategy::ModifiedMartingale,
        RouletteStrategy::Fibonacci12s,
        RouletteStrategy::MixedStreets,
    ];

    /// Preset name as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            RouletteStrategy::ThirdsProgression => "thirds-progression",
            RouletteStrategy::ModifiedMartingale => "modified-martingale",
            RouletteStrategy::Fibonacci12s => "fibonacci-12s",
            RouletteStrategy::MixedStreets => "mixed-streets",
        }
    }

    /// Unit stake the preset was tuned with.
    pub fn default_unit(self) -> i64 {
        match self {
            RouletteStrategy::Fibonacci12s => 100,
            _ => 25,
        }
    }

    /// Pay table the preset's bets settle against.
    pub fn pay_table(self) -> PayTable {
        match self {
            RouletteStrategy::Fibonacci12s => PayTable::true_dozens(),
            _ => PayTable::split_dozens(),
        }
    }

    /// Build the staking plan with `unit` as the smallest stake.
    pub fn plan(self, unit: i64) -> StakingPlan<RouletteBet> {
        let twelves = [RouletteBet::Second12, RouletteBet::Third12];
        match self {
            RouletteStrategy::ThirdsProgression => {
                StakingPlan::progression(twelves, THIRDS_STEPS.iter().map(|m| m * unit).collect())
            }
            RouletteStrategy::ModifiedMartingale => StakingPlan::progression(
                twelves,
                MARTINGALE_STEPS.iter().map(|m| m * unit).collect(),
            ),
            RouletteStrategy::Fibonacci12s => StakingPlan::fibonacci([RouletteBet::Third12], unit),
            RouletteStrategy::MixedStreets => StakingPlan::flat([
                (RouletteBet::Second12, 4 * unit),
                (RouletteBet::Third12, 4 * unit),
                (RouletteBet::ThirdStreet, unit),
                (RouletteBet::FourthStreet, unit),
            ]),
        }
    }
}

impl fmt::Display for RouletteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RouletteStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|p| p.name()).collect();
                format!("unknown strategy '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_double_zero_spin_and_settle() {
        let game = Roulette::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..1_000 {
            let pocket = game.play_round(&mut (), &mut rng).unwrap();
            assert!(pocket.number() <= 37);
            let s = game.settle(&pocket, RouletteBet::Third12, 100);
            let expected = if (25..=36).contains(&pocket.number()) { 200 } else { -100 };
            assert_eq!(s.delta, expected);
        }
    }

    #[test]
    fn test_preset_stakes() {
        let unit = RouletteStrategy::ThirdsProgression.default_unit();
        match RouletteStrategy::ThirdsProgression.plan(unit) {
            StakingPlan::Progression { bets, steps } => {
                assert_eq!(bets, vec![RouletteBet::Second12, RouletteBet::Third12]);
                assert_eq!(steps, vec![25, 50, 150, 450, 850, 1350]);
            }
            other => panic!("unexpected plan {:?}", other),
        }
        match RouletteStrategy::ModifiedMartingale.plan(25) {
            StakingPlan::Progression { steps, .. } => {
                assert_eq!(steps, vec![25, 50, 150, 450, 850]);
            }
            other => panic!("unexpected plan {:?}", other),
        }
        match RouletteStrategy::MixedStreets.plan(25) {
            StakingPlan::Flat { bets } => {
                let stakes: Vec<i64> = bets.iter().map(|b| b.stake).collect();
                assert_eq!(stakes, vec![100, 100, 25, 25]);
            }
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn test_presets_validate_against_their_tables() {
        for preset in RouletteStrategy::ALL {
            let game = Roulette::new(RouletteConfig::default().with_pay_table(preset.pay_table()));
            let plan = preset.plan(preset.default_unit());
            assert!(game.validate().is_ok());
            assert!(game.validate_plan(&plan).is_ok(), "{}", preset);
            assert_eq!(preset.name().parse::<RouletteStrategy>(), Ok(preset));
        }
    }

    #[test]
    fn test_plan_bet_missing_from_table() {
        let game = Roulette::new(RouletteConfig::default().with_pay_table(PayTable::true_dozens()));
        let plan = RouletteStrategy::MixedStreets.plan(25);
        assert_eq!(
            game.validate_plan(&plan),
            Err(ConfigError::UnknownBet("ThirdStreet".to_string()))
        );
    }

    #[test]
    fn test_config_json() {
        let config: RouletteConfig = serde_json::from_str(r#"{"wheel": "single_zero"}"#).unwrap();
        assert_eq!(config.wheel, Wheel::SingleZero);
        assert_eq!(config.pay_table, PayTable::split_dozens());
    }
}
