//! Punto banco baccarat.
//!
//! Two hands, Player and Banker, are dealt two cards each from a multi-deck
//! shoe. Fixed drawing rules decide whether either side takes a third card;
//! the higher mod-10 value wins and equal values tie.
//!
//! ## Module Structure
//!
//! - `card`: Card, Hand and Shoe
//! - `rules`: third-card rules and coup evaluation
//! - `game`: the [`Baccarat`] game, its bet types and strategy presets
//!
//! Only Player and Banker can be backed. A tie settles as a loss for
//! whichever side was bet; the stake is not returned.

pub mod card;
pub mod game;
pub mod rules;

pub use card::{Card, Hand, Shoe, Suit, DECK_SIZE};
pub use game::{
    type_switching, Baccarat, BaccaratConfig, BaccaratRound, BaccaratStrategy, Side,
    SWITCHING_CYCLE,
};
pub use rules::{banker_draws, deal_coup, player_draws, Coup, Winner, MAX_CARDS_PER_COUP};
