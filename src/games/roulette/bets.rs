//! Roulette bet types and pay tables.
//!
//! A bet covers a contiguous range of numbers and pays a fixed multiple of
//! the stake when the ball lands inside it. Zero and double zero are never
//! covered. Which range and multiple each bet type stands for is table
//! configuration, so the same bet name can pay differently per variant.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::wheel::Pocket;
use crate::sim::config::ConfigError;
use crate::sim::game::Settlement;

/// Bet types offered by the simulated systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RouletteBet {
    /// A twelve-number block (range set by the pay table).
    Second12,
    /// The top twelve-number block.
    Third12,
    /// Street 7-8-9.
    ThirdStreet,
    /// Street 10-11-12.
    FourthStreet,
}

impl RouletteBet {
    /// Every bet type.
    pub const ALL: [RouletteBet; 4] = [
        RouletteBet::Second12,
        RouletteBet::Third12,
        RouletteBet::ThirdStreet,
        RouletteBet::FourthStreet,
    ];
}

impl fmt::Display for RouletteBet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouletteBet::Second12 => "Second12",
            RouletteBet::Third12 => "Third12",
            RouletteBet::ThirdStreet => "ThirdStreet",
            RouletteBet::FourthStreet => "FourthStreet",
        };
        f.write_str(name)
    }
}

/// Largest payout multiplier a coverage may carry (a straight-up number).
pub const MAX_MULTIPLIER: i64 = 35;

/// The numbers a bet covers and what it pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    /// Lowest covered number.
    pub low: u8,
    /// Highest covered number (inclusive).
    pub high: u8,
    /// Winnings per unit staked.
    pub multiplier: i64,
}

impl Coverage {
    /// Cover `low..=high` paying `multiplier`.
    pub const fn new(low: u8, high: u8, multiplier: i64) -> Self {
        Self {
            low,
            high,
            multiplier,
        }
    }

    /// Whether the pocket is inside the range.
    #[inline]
    pub fn covers(&self, pocket: Pocket) -> bool {
        (self.low..=self.high).contains(&pocket.number())
    }

    fn validate(&self, bet: RouletteBet) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidCoverage {
            bet: bet.to_string(),
            reason,
        };
        if self.low < 1 || self.high > 36 {
            return Err(invalid(format!(
                "range {}-{} is outside 1-36",
                self.low, self.high
            )));
        }
        if self.low > self.high {
            return Err(invalid(format!("range {}-{} is empty", self.low, self.high)));
        }
        if self.multiplier <= 0 || self.multiplier > MAX_MULTIPLIER {
            return Err(invalid(format!(
                "multiplier {} must be between 1 and {}",
                self.multiplier, MAX_MULTIPLIER
            )));
        }
        Ok(())
    }
}

/// Bet type to coverage lookup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayTable(FxHashMap<RouletteBet, Coverage>);

impl PayTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add or replace a bet's coverage.
    pub fn with(mut self, bet: RouletteBet, coverage: Coverage) -> Self {
        self.0.insert(bet, coverage);
        self
    }

    /// Doubled twelves and streets: 19-36 and 25-36 at 2:1, 7-9 and 10-12
    /// at 11:1.
    pub fn split_dozens() -> Self {
        Self::new()
            .with(RouletteBet::Second12, Coverage::new(19, 36, 2))
            .with(RouletteBet::Third12, Coverage::new(25, 36, 2))
            .with(RouletteBet::ThirdStreet, Coverage::new(7, 9, 11))
            .with(RouletteBet::FourthStreet, Coverage::new(10, 12, 11))
    }

    /// Plain dozens 13-24 and 25-36 paying 3 per unit.
    pub fn true_dozens() -> Self {
        Self::new()
            .with(RouletteBet::Second12, Coverage::new(13, 24, 3))
            .with(RouletteBet::Third12, Coverage::new(25, 36, 3))
    }

    /// Coverage for a bet, if the table has one.
    pub fn get(&self, bet: RouletteBet) -> Option<&Coverage> {
        self.0.get(&bet)
    }

    /// Whether the table can settle `bet`.
    pub fn contains(&self, bet: RouletteBet) -> bool {
        self.0.contains_key(&bet)
    }

    /// Number of bet types in the table.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Settle one wager. A bet missing from the table never wins.
    pub fn settle(&self, pocket: Pocket, bet: RouletteBet, stake: i64) -> Settlement {
        match self.get(bet) {
            Some(coverage) if coverage.covers(pocket) => {
                Settlement::win(stake.saturating_mul(coverage.multiplier))
            }
            _ => Settlement::lose(stake),
        }
    }

    /// Check every entry's range and multiplier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort_by_key(|(bet, _)| **bet);
        for (bet, coverage) in entries {
            coverage.validate(*bet)?;
        }
        Ok(())
    }
}
