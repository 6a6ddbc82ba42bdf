//! Punto banco drawing rules and coup evaluation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::card::{Hand, Shoe};
use crate::sim::game::GameError;

/// Most cards a single coup can consume.
pub const MAX_CARDS_PER_COUP: usize = 6;

/// Player draws a third card on a two-card value of 0-5.
#[inline]
pub fn player_draws(player_value: u8) -> bool {
    player_value <= 5
}

/// Banker's third-card rule.
///
/// `player_value` is Player's final value: the three-card value if Player
/// drew, otherwise the two-card value.
pub fn banker_draws(banker_value: u8, player_value: u8) -> bool {
    match banker_value {
        0..=2 => true,
        3 => player_value != 8,
        4 => (2..=7).contains(&player_value),
        5 => (4..=7).contains(&player_value),
        6 => (6..=7).contains(&player_value),
        _ => false,
    }
}

/// Which side a coup went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    /// Player's final value is higher.
    Player,
    /// Banker's final value is higher.
    Banker,
    /// Equal values.
    Tie,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Player => write!(f, "Player"),
            Winner::Banker => write!(f, "Banker"),
            Winner::Tie => write!(f, "Tie"),
        }
    }
}

/// One fully drawn coup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coup {
    /// Player's final hand.
    pub player: Hand,
    /// Banker's final hand.
    pub banker: Hand,
}

impl Coup {
    /// Deal a coup from the front of the shoe without reshuffling.
    ///
    /// Player receives the first two cards, Banker the next two, then the
    /// third-card rules are applied.
    pub fn deal(shoe: &mut Shoe) -> Result<Self, GameError> {
        let player = Hand::new(shoe.draw()?, shoe.draw()?);
        let banker = Hand::new(shoe.draw()?, shoe.draw()?);
        Self::complete(player, banker, shoe)
    }

    /// Apply the third-card rules to two-card hands.
    pub fn complete(mut player: Hand, mut banker: Hand, shoe: &mut Shoe) -> Result<Self, GameError> {
        if player_draws(player.value()) {
            player.push(shoe.draw()?);
        }
        if banker_draws(banker.value(), player.value()) {
            banker.push(shoe.draw()?);
        }
        Ok(Self { player, banker })
    }

    /// Player's final value.
    pub fn player_value(&self) -> u8 {
        self.player.value()
    }

    /// Banker's final value.
    pub fn banker_value(&self) -> u8 {
        self.banker.value()
    }

    /// Higher value wins; equal values tie.
    pub fn winner(&self) -> Winner {
        match self.player_value().cmp(&self.banker_value()) {
            std::cmp::Ordering::Greater => Winner::Player,
            std::cmp::Ordering::Less => Winner::Banker,
            std::cmp::Ordering::Equal => Winner::Tie,
        }
    }
}

impl fmt::Display for Coup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {} | Banker {} => {}", self.player, self.banker, self.winner())
    }
}

/// Deal one coup, reshuffling first if fewer than `threshold` cards remain.
pub fn deal_coup<R: Rng + ?Sized>(
    shoe: &mut Shoe,
    threshold: usize,
    rng: &mut R,
) -> Result<Coup, GameError> {
    if shoe.remaining() < threshold {
        shoe.reshuffle(rng);
    }
    Coup::deal(shoe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::baccarat::card::{Card, Suit};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_player_rule() {
        for v in 0..=5 {
            assert!(player_draws(v));
        }
        for v in 6..=9 {
            assert!(!player_draws(v));
        }
    }

    #[test]
    fn test_banker_rule_table() {
        // (banker value, player values on which banker draws)
        let table: [(u8, &[u8]); 10] = [
            (0, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
            (1, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
            (2, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
            (3, &[0, 1, 2, 3, 4, 5, 6, 7, 9]),
            (4, &[2, 3, 4, 5, 6, 7]),
            (5, &[4, 5, 6, 7]),
            (6, &[6, 7]),
            (7, &[]),
            (8, &[]),
            (9, &[]),
        ];
        for (banker, draws_on) in table {
            for player in 0..=9 {
                assert_eq!(
                    banker_draws(banker, player),
                    draws_on.contains(&player),
                    "banker {} player {}",
                    banker,
                    player
                );
            }
        }
    }

    #[test]
    fn test_player_stands_banker_draws() {
        // Player 3,4 = 7 stands; Banker 10,2 = 2 draws a 5.
        let mut shoe = Shoe::stacked(8, &[3, 4, 10, 2, 5]).unwrap();
        assert_eq!(shoe.size(), 416);

        let coup = Coup::deal(&mut shoe).unwrap();
        assert_eq!(coup.player.len(), 2);
        assert_eq!(coup.player_value(), 7);
        assert_eq!(coup.banker.len(), 3);
        assert_eq!(coup.banker.third().map(|c| c.rank()), Some(5));
        assert_eq!(coup.banker_value(), 7);
        assert_eq!(coup.winner(), Winner::Tie);
        assert_eq!(shoe.remaining(), 411);
    }

    #[test]
    fn test_banker_uses_player_final_value() {
        // Player 2,3 = 5 draws a 3 for 8; Banker 1,2 = 3 stands on Player 8.
        let mut shoe = Shoe::stacked(8, &[2, 3, 1, 2, 3]).unwrap();
        let coup = Coup::deal(&mut shoe).unwrap();
        assert_eq!(coup.player_value(), 8);
        assert_eq!(coup.banker.len(), 2);
        assert_eq!(coup.winner(), Winner::Player);
    }

    #[test]
    fn test_naturals_stand() {
        let mut shoe = Shoe::stacked(1, &[4, 4, 9, 10]).unwrap();
        let coup = Coup::deal(&mut shoe).unwrap();
        assert_eq!(coup.player.len(), 2);
        assert_eq!(coup.banker.len(), 2);
        assert_eq!(coup.winner(), Winner::Banker);
    }

    #[test]
    fn test_exhausted_shoe_is_an_error() {
        let cards = [1, 2, 3].map(|r| Card::new(r, Suit::Hearts)).to_vec();
        let mut shoe = Shoe::from_cards(1, cards);
        assert!(Coup::deal(&mut shoe).is_err());
    }

    #[test]
    fn test_deal_coup_reshuffles_below_threshold() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let cards = [1, 2, 3, 4, 5].map(|r| Card::new(r, Suit::Clubs)).to_vec();
        let mut shoe = Shoe::from_cards(1, cards);

        let coup = deal_coup(&mut shoe, MAX_CARDS_PER_COUP, &mut rng).unwrap();
        let used = coup.player.len() + coup.banker.len();
        assert_eq!(shoe.remaining(), 52 - used);
    }

    #[test]
    fn test_long_run_never_exhausts() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut shoe = Shoe::shuffled(1, &mut rng);
        for _ in 0..5_000 {
            let coup = deal_coup(&mut shoe, MAX_CARDS_PER_COUP, &mut rng).unwrap();
            assert!(coup.player_value() <= 9 && coup.banker_value() <= 9);
        }
    }
}
