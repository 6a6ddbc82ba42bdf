//! Baccarat as a simulated game.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::card::{Shoe, DECK_SIZE};
use super::rules::{deal_coup, Coup, Winner, MAX_CARDS_PER_COUP};
use crate::sim::config::ConfigError;
use crate::sim::game::{Game, GameError, Settlement};
use crate::sim::strategy::StakingPlan;

/// Bet type cycle of the type-switching strategy, one entry per
/// consecutive loss.
pub const SWITCHING_CYCLE: [Side; 5] = [
    Side::Banker,
    Side::Player,
    Side::Player,
    Side::Banker,
    Side::Banker,
];

/// The side a wager backs. Tie is never bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Pays 1:1.
    Player,
    /// Pays the banker payout factor.
    Banker,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "Player"),
            Side::Banker => write!(f, "Banker"),
        }
    }
}

impl Side {
    fn is_winner(self, winner: Winner) -> bool {
        matches!(
            (self, winner),
            (Side::Player, Winner::Player) | (Side::Banker, Winner::Banker)
        )
    }
}

/// Table configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaccaratConfig {
    /// Standard decks in the shoe.
    pub decks: u32,
    /// Reshuffle before a coup when fewer cards than this remain.
    pub reshuffle_threshold: usize,
    /// Banker wins pay `floor(stake × banker_payout)`.
    pub banker_payout: f64,
}

impl Default for BaccaratConfig {
    fn default() -> Self {
        Self {
            decks: 8,
            reshuffle_threshold: MAX_CARDS_PER_COUP,
            banker_payout: 0.95,
        }
    }
}

impl BaccaratConfig {
    /// Builder method: set the number of decks.
    pub fn with_decks(mut self, decks: u32) -> Self {
        self.decks = decks;
        self
    }

    /// Builder method: set the banker payout factor.
    pub fn with_banker_payout(mut self, payout: f64) -> Self {
        self.banker_payout = payout;
        self
    }

    /// Builder method: set the reshuffle threshold.
    pub fn with_reshuffle_threshold(mut self, threshold: usize) -> Self {
        self.reshuffle_threshold = threshold;
        self
    }

    /// Cards in a full shoe.
    pub fn shoe_size(&self) -> usize {
        self.decks as usize * DECK_SIZE
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decks == 0 {
            return Err(ConfigError::ZeroDecks);
        }
        let max = self.shoe_size() - 1;
        if self.reshuffle_threshold < MAX_CARDS_PER_COUP || self.reshuffle_threshold > max {
            return Err(ConfigError::ReshuffleThreshold {
                threshold: self.reshuffle_threshold,
                min: MAX_CARDS_PER_COUP,
                max,
            });
        }
        if !(self.banker_payout > 0.0 && self.banker_payout <= 1.0) {
            return Err(ConfigError::BankerPayout(self.banker_payout));
        }
        Ok(())
    }
}

/// One coup as written to the trial history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaccaratRound {
    /// Player's card ranks in dealing order.
    pub player_cards: Vec<u8>,
    /// Banker's card ranks in dealing order.
    pub banker_cards: Vec<u8>,
    /// Player's final value.
    pub player_value: u8,
    /// Banker's final value.
    pub banker_value: u8,
    /// Winning side or tie.
    pub winner: Winner,
}

/// Punto banco dealt from a per-trial shoe.
#[derive(Debug, Clone, Default)]
pub struct Baccarat {
    config: BaccaratConfig,
}

impl Baccarat {
    /// Create a table with the given configuration.
    pub fn new(config: BaccaratConfig) -> Self {
        Self { config }
    }

    /// The table configuration.
    pub fn config(&self) -> &BaccaratConfig {
        &self.config
    }

    /// Banker win payout for a stake, truncated to whole units.
    pub fn banker_payout(&self, stake: i64) -> i64 {
        (stake as f64 * self.config.banker_payout).floor() as i64
    }
}

impl Game for Baccarat {
    type BetType = Side;
    type Table = Shoe;
    type Outcome = Coup;
    type Record = BaccaratRound;

    fn name(&self) -> &'static str {
        "baccarat"
    }

    fn new_table<R: Rng + ?Sized>(&self, rng: &mut R) -> Shoe {
        Shoe::shuffled(self.config.decks, rng)
    }

    fn play_round<R: Rng + ?Sized>(&self, shoe: &mut Shoe, rng: &mut R) -> Result<Coup, GameError> {
        deal_coup(shoe, self.config.reshuffle_threshold, rng)
    }

    fn settle(&self, coup: &Coup, bet: Side, stake: i64) -> Settlement {
        if !bet.is_winner(coup.winner()) {
            return Settlement::lose(stake);
        }
        match bet {
            Side::Player => Settlement::win(stake),
            Side::Banker => Settlement::win(self.banker_payout(stake)),
        }
    }

    fn describe(&self, coup: &Coup) -> BaccaratRound {
        BaccaratRound {
            player_cards: coup.player.ranks(),
            banker_cards: coup.banker.ranks(),
            player_value: coup.player_value(),
            banker_value: coup.banker_value(),
            winner: coup.winner(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }
}

/// Named baccarat staking systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaccaratStrategy {
    /// Double on loss while switching sides; reset on a win or the 6th loss.
    TypeSwitching,
    /// Fixed stake on Player.
    FlatPlayer,
    /// Fixed stake on Banker.
    FlatBanker,
    /// Fibonacci-like progression on Banker.
    FibonacciBanker,
}

impl BaccaratStrategy {
    /// Every preset.
    pub const ALL: [BaccaratStrategy; 4] = [
        BaccaratStrategy::TypeSwitching,
        BaccaratStrategy::FlatPlayer,
        BaccaratStrategy::FlatBanker,
        BaccaratStrategy::FibonacciBanker,
    ];

    /// Preset name as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            BaccaratStrategy::TypeSwitching => "type-switching",
            BaccaratStrategy::FlatPlayer => "flat-player",
            BaccaratStrategy::FlatBanker => "flat-banker",
            BaccaratStrategy::FibonacciBanker => "fibonacci-banker",
        }
    }

    /// Build the staking plan with `unit` as the base stake.
    pub fn plan(self, unit: i64) -> StakingPlan<Side> {
        match self {
            BaccaratStrategy::TypeSwitching => type_switching(unit),
            BaccaratStrategy::FlatPlayer => StakingPlan::flat([(Side::Player, unit)]),
            BaccaratStrategy::FlatBanker => StakingPlan::flat([(Side::Banker, unit)]),
            BaccaratStrategy::FibonacciBanker => StakingPlan::fibonacci([Side::Banker], unit),
        }
    }
}

impl fmt::Display for BaccaratStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BaccaratStrategy {
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

/// The type-switching system starting on Player with `base`.
pub fn type_switching(base: i64) -> StakingPlan<Side> {
    StakingPlan::TypeSwitching {
        base,
        default: Side::Player,
        cycle: SWITCHING_CYCLE.to_vec(),
    }
}
