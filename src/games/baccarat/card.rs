//! Card representation for baccarat.
//!
//! This module provides the card types used by the baccarat table:
//! - `Card`: a single playing card, face ranks collapsed to 10
//! - `Hand`: two or three cards with a mod-10 value
//! - `Shoe`: one or more 52-card decks dealt from the front

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sim::game::GameError;

/// Cards in one standard deck.
pub const DECK_SIZE: usize = 52;

/// Ranks of one suit: ace, 2-9, then ten, jack, queen and king all as 10.
const SUIT_RANKS: [u8; 13] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10];

/// Rank characters for display, indexed by rank - 1.
const RANK_CHARS: [char; 10] = ['A', '2', '3', '4', '5', '6', '7', '8', '9', 'T'];

/// Suit of a card. Irrelevant to value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    /// ♣
    Clubs,
    /// ♦
    Diamonds,
    /// ♥
    Hearts,
    /// ♠
    Spades,
}

impl Suit {
    /// All four suits.
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    fn as_char(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        }
    }
}

/// A single playing card.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    rank: u8,
    suit: Suit,
}

impl Card {
    /// Create a card from rank (1-10, 10 for every ten and face card) and suit.
    #[inline]
    pub fn new(rank: u8, suit: Suit) -> Self {
        debug_assert!((1..=10).contains(&rank), "rank must be 1-10");
        Self { rank, suit }
    }

    /// Get the card's rank (1-10).
    #[inline]
    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// Get the card's suit.
    #[inline]
    pub fn suit(&self) -> Suit {
        self.suit
    }

    /// Baccarat points: the rank, with 10 counting as 0.
    #[inline]
    pub fn points(&self) -> u8 {
        if self.rank >= 10 {
            0
        } else {
            self.rank
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", RANK_CHARS[(self.rank - 1) as usize], self.suit.as_char())
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// A baccarat hand of two or three cards.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Hand {
    cards: [Card; 3],
    len: u8,
}

impl Hand {
    /// Maximum cards a hand can hold.
    pub const MAX_CARDS: usize = 3;

    /// A two-card hand.
    pub fn new(first: Card, second: Card) -> Self {
        Self {
            cards: [first, second, second],
            len: 2,
        }
    }

    /// Add the third card.
    pub fn push(&mut self, card: Card) {
        debug_assert!((self.len as usize) < Self::MAX_CARDS, "hand already holds three cards");
        self.cards[2] = card;
        self.len = 3;
    }

    /// Cards in the hand, in dealing order.
    pub fn cards(&self) -> &[Card] {
        &self.cards[..self.len as usize]
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Hands are never empty; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The third card, if one was drawn.
    pub fn third(&self) -> Option<Card> {
        (self.len == 3).then_some(self.cards[2])
    }

    /// Hand value: sum of points mod 10, always 0-9.
    pub fn value(&self) -> u8 {
        self.cards().iter().map(|c| c.points()).sum::<u8>() % 10
    }

    /// Card ranks for display and history.
    pub fn ranks(&self) -> Vec<u8> {
        self.cards().iter().map(|c| c.rank()).collect()
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, card) in self.cards().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", card)?;
        }
        write!(f, " ({})", self.value())
    }
}

impl fmt::Debug for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// A shoe of one or more decks.
///
/// Cards are dealt from the front. A draw on an empty shoe is an error;
/// callers reshuffle before the shoe runs low.
#[derive(Debug, Clone)]
pub struct Shoe {
    decks: u32,
    cards: Vec<Card>,
    next: usize,
}

impl Shoe {
    /// An unshuffled shoe of `decks` standard decks.
    pub fn new(decks: u32) -> Self {
        Self {
            decks,
            cards: Self::build(decks),
            next: 0,
        }
    }

    /// A freshly shuffled shoe.
    pub fn shuffled<R: Rng + ?Sized>(decks: u32, rng: &mut R) -> Self {
        let mut shoe = Self::new(decks);
        shoe.cards.shuffle(rng);
        shoe
    }

    /// A shoe with the given cards in dealing order.
    ///
    /// `decks` is used when the shoe is next reshuffled.
    pub fn from_cards(decks: u32, cards: Vec<Card>) -> Self {
        Self {
            decks,
            cards,
            next: 0,
        }
    }

    /// An unshuffled shoe with cards of the given ranks moved to the top.
    ///
    /// Returns `None` if the shoe does not hold enough cards of some rank.
    pub fn stacked(decks: u32, top: &[u8]) -> Option<Self> {
        let mut shoe = Self::new(decks);
        for (i, &rank) in top.iter().enumerate() {
            let j = i + shoe.cards[i..].iter().position(|c| c.rank() == rank)?;
            shoe.cards.swap(i, j);
        }
        Some(shoe)
    }

    fn build(decks: u32) -> Vec<Card> {
        let mut cards = Vec::with_capacity(decks as usize * DECK_SIZE);
        for _ in 0..decks {
            for &suit in &Suit::ALL {
                for &rank in &SUIT_RANKS {
                    cards.push(Card::new(rank, suit));
                }
            }
        }
        cards
    }

    /// Deal the front card.
    pub fn draw(&mut self) -> Result<Card, GameError> {
        let card = self
            .cards
            .get(self.next)
            .copied()
            .ok_or(GameError::ShoeExhausted {
                shoe_size: self.cards.len(),
            })?;
        self.next += 1;
        Ok(card)
    }

    /// Rebuild the full shoe and shuffle it.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards = Self::build(self.decks);
        self.cards.shuffle(rng);
        self.next = 0;
    }

    /// Cards not yet dealt.
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }

    /// Cards in the shoe when full.
    pub fn size(&self) -> usize {
        self.cards.len()
    }

    /// Number of decks.
    pub fn decks(&self) -> u32 {
        self.decks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn card(rank: u8) -> Card {
        Card::new(rank, Suit::Spades)
    }

    #[test]
    fn test_shoe_composition() {
        let shoe = Shoe::new(8);
        assert_eq!(shoe.size(), 416);
        assert_eq!(shoe.remaining(), 416);

        let tens = shoe.cards.iter().filter(|c| c.rank() == 10).count();
        let aces = shoe.cards.iter().filter(|c| c.rank() == 1).count();
        assert_eq!(tens, 8 * 16);
        assert_eq!(aces, 8 * 4);
    }

    #[test]
    fn test_draw_until_empty() {
        let mut shoe = Shoe::from_cards(1, vec![card(3), card(9)]);
        assert_eq!(shoe.draw().unwrap().rank(), 3);
        assert_eq!(shoe.draw().unwrap().rank(), 9);
        assert_eq!(shoe.remaining(), 0);
        assert_eq!(shoe.draw(), Err(GameError::ShoeExhausted { shoe_size: 2 }));
    }

    #[test]
    fn test_reshuffle_restores_full_shoe() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut shoe = Shoe::shuffled(2, &mut rng);
        for _ in 0..100 {
            shoe.draw().unwrap();
        }
        shoe.reshuffle(&mut rng);
        assert_eq!(shoe.remaining(), 104);
    }

    #[test]
    fn test_stacked_top() {
        let mut shoe = Shoe::stacked(8, &[3, 4, 10, 2]).unwrap();
        assert_eq!(shoe.size(), 416);
        let ranks: Vec<u8> = (0..4).map(|_| shoe.draw().unwrap().rank()).collect();
        assert_eq!(ranks, vec![3, 4, 10, 2]);

        // A single deck only has four sevens.
        assert!(Shoe::stacked(1, &[7, 7, 7, 7, 7]).is_none());
    }

    #[test]
    fn test_hand_value_mod_10() {
        let mut hand = Hand::new(card(9), card(8));
        assert_eq!(hand.value(), 7);
        hand.push(card(10));
        assert_eq!(hand.value(), 7);
        assert_eq!(hand.len(), 3);
        assert_eq!(Hand::new(card(10), card(10)).value(), 0);
        assert_eq!(Hand::new(card(5), card(4)).value(), 9);
    }

    #[test]
    fn test_hand_value_always_in_range() {
        for a in 1..=10 {
            for b in 1..=10 {
                for c in 1..=10 {
                    let mut hand = Hand::new(card(a), card(b));
                    assert!(hand.value() <= 9);
                    hand.push(card(c));
                    assert!(hand.value() <= 9);
                    assert!(hand.cards().len() <= Hand::MAX_CARDS);
                }
            }
        }
    }

    #[test]
    fn test_display() {
        let hand = Hand::new(Card::new(1, Suit::Hearts), Card::new(10, Suit::Clubs));
        assert_eq!(hand.to_string(), "Ah Tc (1)");
    }
}
