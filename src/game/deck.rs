use crate::game::error::{GameError, GameResult};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single playing card.
/// Rank 2-14 (Jack=11, Queen=12, King=13, Ace=14), suit 0-3
/// (Clubs, Diamonds, Hearts, Spades).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: u8,
    pub suit: u8,
}

impl Card {
    pub fn new(rank: u8, suit: u8) -> Self {
        Self { rank, suit }
    }

    fn suit_char(suit: u8) -> char {
        match suit {
            0 => '♣',
            1 => '♦',
            2 => '♥',
            3 => '♠',
            _ => '?',
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank_str = match self.rank {
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            14 => "A".to_string(),
            n => n.to_string(),
        };
        write!(f, "{}{}", rank_str, Self::suit_char(self.suit))
    }
}

/// An ordered deck with a cursor to the next undealt card.
/// Every card is either already dealt (before the cursor) or live (at or
/// after it), so a snapshot of the deck captures the full deal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
    cursor: usize,
}

impl Deck {
    fn full_set() -> Vec<Card> {
        let mut cards = Vec::with_capacity(52);
        for suit in 0..4 {
            for rank in 2..=14 {
                cards.push(Card::new(rank, suit));
            }
        }
        cards
    }

    /// Creates a full 52-card deck permuted with Fisher-Yates over the
    /// caller-supplied RNG. Seed the RNG for reproducible deals.
    pub fn shuffled(rng: &mut ChaCha20Rng) -> Self {
        let mut cards = Self::full_set();
        cards.shuffle(rng);
        Self { cards, cursor: 0 }
    }

    /// Builds a deck with a fixed deal order. Used to rehydrate snapshots
    /// and to stack decks in deterministic tests.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards, cursor: 0 }
    }

    /// Draws the next card, advancing the cursor.
    pub fn draw(&mut self) -> GameResult<Card> {
        if self.cursor >= self.cards.len() {
            return Err(GameError::DeckExhausted {
                requested: 1,
                remaining: 0,
            });
        }
        let card = self.cards[self.cursor];
        self.cursor += 1;
        Ok(card)
    }

    /// Draws `n` cards in deal order.
    pub fn draw_n(&mut self, n: usize) -> GameResult<Vec<Card>> {
        if self.remaining() < n {
            return Err(GameError::DeckExhausted {
                requested: n,
                remaining: self.remaining(),
            });
        }
        let mut dealt = Vec::with_capacity(n);
        for _ in 0..n {
            dealt.push(self.draw()?);
        }
        Ok(dealt)
    }

    /// Number of undealt cards.
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }

    /// Number of cards drawn so far.
    pub fn dealt(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_shuffled_deck_has_52_distinct_cards() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let mut deck = Deck::shuffled(&mut rng);
        assert_eq!(deck.remaining(), 52);

        let mut seen = HashSet::new();
        while deck.remaining() > 0 {
            assert!(seen.insert(deck.draw().unwrap()), "duplicate card dealt");
        }
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn test_same_seed_same_order() {
        let mut rng_a = ChaCha20Rng::seed_from_u64(42);
        let mut rng_b = ChaCha20Rng::seed_from_u64(42);
        let mut a = Deck::shuffled(&mut rng_a);
        let mut b = Deck::shuffled(&mut rng_b);
        for _ in 0..52 {
            assert_eq!(a.draw().unwrap(), b.draw().unwrap());
        }
    }

    #[test]
    fn test_different_seed_different_order() {
        let mut rng_a = ChaCha20Rng::seed_from_u64(1);
        let mut rng_b = ChaCha20Rng::seed_from_u64(2);
        let mut a = Deck::shuffled(&mut rng_a);
        let mut b = Deck::shuffled(&mut rng_b);
        let first_a: Vec<Card> = a.draw_n(5).unwrap();
        let first_b: Vec<Card> = b.draw_n(5).unwrap();
        assert_ne!(first_a, first_b);
    }

    #[test]
    fn test_draw_reduces_remaining() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let mut deck = Deck::shuffled(&mut rng);
        deck.draw().unwrap();
        assert_eq!(deck.remaining(), 51);
        assert_eq!(deck.dealt(), 1);
    }

    #[test]
    fn test_draw_n() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let mut deck = Deck::shuffled(&mut rng);
        let cards = deck.draw_n(5).unwrap();
        assert_eq!(cards.len(), 5);
        assert_eq!(deck.remaining(), 47);
    }

    #[test]
    fn test_deck_exhaustion() {
        let mut deck = Deck::from_cards(vec![Card::new(14, 3), Card::new(2, 0)]);
        assert!(deck.draw_n(2).is_ok());
        assert_eq!(
            deck.draw(),
            Err(GameError::DeckExhausted {
                requested: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn test_card_to_string() {
        let card = Card::new(14, 3); // Ace of Spades
        assert!(card.to_string().contains('A'));
        assert_eq!(Card::new(10, 2).to_string(), "10♥");
    }
}
