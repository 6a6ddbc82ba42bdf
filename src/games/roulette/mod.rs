//! Roulette.
//!
//! Each round is one spin: a uniformly random pocket on a single-zero
//! (0-36) or double-zero (0-36 plus 00) wheel. There is no state between
//! spins. Bets cover a range of numbers from the pay table and pay a fixed
//! multiple of the stake.

pub mod bets;
pub mod game;
pub mod wheel;

pub use bets::{Coverage, PayTable, RouletteBet, MAX_MULTIPLIER};
pub use game::{Roulette, RouletteConfig, RouletteStrategy, MARTINGALE_STEPS, THIRDS_STEPS};
pub use wheel::{Pocket, Wheel, DOUBLE_ZERO};
