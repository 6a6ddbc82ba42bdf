//! Roulette wheels and pockets.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index used for the double-zero pocket.
pub const DOUBLE_ZERO: u8 = 37;

/// A pocket the ball landed in: 0-36, or 37 for "00".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pocket(pub u8);

impl Pocket {
    /// The pocket number (37 for "00").
    #[inline]
    pub fn number(self) -> u8 {
        self.0
    }

    /// True for 0 and 00.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0 || self.0 == DOUBLE_ZERO
    }
}

impl fmt::Display for Pocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == DOUBLE_ZERO {
            write!(f, "00")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Wheel layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wheel {
    /// European wheel: 0-36.
    SingleZero,
    /// American wheel: 0-36 plus 00.
    #[default]
    DoubleZero,
}

impl Wheel {
    /// Number of pockets on the wheel.
    pub fn pockets(self) -> u8 {
        match self {
            Wheel::SingleZero => 37,
            Wheel::DoubleZero => 38,
        }
    }

    /// Spin once. Every pocket is equally likely.
    #[inline]
    pub fn spin<R: Rng + ?Sized>(self, rng: &mut R) -> Pocket {
        Pocket(rng.gen_range(0..self.pockets()))
    }
}

impl fmt::Display for Wheel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wheel::SingleZero => write!(f, "single-zero"),
            Wheel::DoubleZero => write!(f, "double-zero"),
        }
    }
}
