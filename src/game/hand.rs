//! Showdown hand evaluation.
//!
//! Produces a totally ordered strength key for the best 5-card hand out of
//! 5-7 cards, plus a human-readable description for display. The key is
//! `(category, tiebreakers)` where tiebreakers are card ranks in descending
//! significance; comparing keys lexicographically yields the poker ordering.

use crate::game::deck::Card;
use crate::game::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};

/// Hand categories from weakest to strongest. A Royal Flush is the ace-high
/// StraightFlush and carries no category of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandCategory {
    HighCard,
    Pair,
    TwoPair,
    Trips,
    Straight,
    Flush,
    FullHouse,
    Quads,
    StraightFlush,
}

/// Comparable strength key for a 5-card hand.
///
/// Tiebreakers hold ranks (2-14) in descending significance:
/// pair: [pair, k1, k2, k3]; two pair: [high pair, low pair, kicker];
/// trips: [trips, k1, k2]; full house: [trips, pair]; quads: [quads, kicker];
/// straights: [high card] (the wheel counts as 5-high); flush and high card:
/// all five ranks descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandRank {
    pub category: HandCategory,
    pub tiebreakers: Vec<u8>,
}

impl PartialOrd for HandRank {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandRank {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.category
            .cmp(&other.category)
            .then_with(|| self.tiebreakers.cmp(&other.tiebreakers))
    }
}

fn rank_word(rank: u8) -> &'static str {
    match rank {
        2 => "Two",
        3 => "Three",
        4 => "Four",
        5 => "Five",
        6 => "Six",
        7 => "Seven",
        8 => "Eight",
        9 => "Nine",
        10 => "Ten",
        11 => "Jack",
        12 => "Queen",
        13 => "King",
        14 => "Ace",
        _ => "?",
    }
}

fn rank_plural(rank: u8) -> String {
    match rank {
        6 => "Sixes".to_string(),
        r => format!("{}s", rank_word(r)),
    }
}

impl HandRank {
    /// Human-readable description, e.g. "Full House, Queens full of Tens".
    /// Presentational only; never part of the ordering.
    pub fn describe(&self) -> String {
        let t = &self.tiebreakers;
        match self.category {
            HandCategory::StraightFlush => {
                if t.first() == Some(&14) {
                    "Royal Flush".to_string()
                } else {
                    format!("Straight Flush, {} High", rank_word(t[0]))
                }
            }
            HandCategory::Quads => format!("Four of a Kind, {}", rank_plural(t[0])),
            HandCategory::FullHouse => format!(
                "Full House, {} full of {}",
                rank_plural(t[0]),
                rank_plural(t[1])
            ),
            HandCategory::Flush => format!("Flush, {} High", rank_word(t[0])),
            HandCategory::Straight => format!("Straight, {} High", rank_word(t[0])),
            HandCategory::Trips => format!("Three of a Kind, {}", rank_plural(t[0])),
            HandCategory::TwoPair => format!(
                "Two Pair, {} and {}",
                rank_plural(t[0]),
                rank_plural(t[1])
            ),
            HandCategory::Pair => format!("Pair of {}", rank_plural(t[0])),
            HandCategory::HighCard => format!("High Card, {}", rank_word(t[0])),
        }
    }
}

/// Evaluates the best 5-card selection out of 5-7 cards.
pub fn evaluate_hand(cards: &[Card]) -> GameResult<HandRank> {
    if cards.len() < 5 {
        return Err(GameError::InsufficientCards { got: cards.len() });
    }

    let n = cards.len();
    let mut best: Option<HandRank> = None;
    for i in 0..n - 4 {
        for j in i + 1..n - 3 {
            for k in j + 1..n - 2 {
                for l in k + 1..n - 1 {
                    for m in l + 1..n {
                        let five = [cards[i], cards[j], cards[k], cards[l], cards[m]];
                        let rank = rank_five(&five);
                        if best.as_ref().map(|b| rank > *b).unwrap_or(true) {
                            best = Some(rank);
                        }
                    }
                }
            }
        }
    }

    // The loops above always produce at least one combination for n >= 5.
    best.ok_or(GameError::InsufficientCards { got: n })
}

/// Evaluates exactly 5 cards.
fn rank_five(cards: &[Card; 5]) -> HandRank {
    let mut ranks: Vec<u8> = cards.iter().map(|c| c.rank).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let is_wheel = ranks == [14, 5, 4, 3, 2];
    let is_straight = !is_wheel && ranks.windows(2).all(|w| w[0] == w[1] + 1);

    if is_flush && (is_straight || is_wheel) {
        let high = if is_wheel { 5 } else { ranks[0] };
        return HandRank {
            category: HandCategory::StraightFlush,
            tiebreakers: vec![high],
        };
    }

    // Group ranks by multiplicity, strongest groups first
    let mut counts = [0u8; 15];
    for &r in &ranks {
        counts[r as usize] += 1;
    }
    let mut quads = None;
    let mut trips = None;
    let mut pairs: Vec<u8> = Vec::new();
    let mut singles: Vec<u8> = Vec::new();
    for r in (2..=14u8).rev() {
        match counts[r as usize] {
            4 => quads = Some(r),
            3 => trips = Some(r),
            2 => pairs.push(r),
            1 => singles.push(r),
            _ => {}
        }
    }

    if let Some(q) = quads {
        return HandRank {
            category: HandCategory::Quads,
            tiebreakers: vec![q, singles[0]],
        };
    }
    if let (Some(t), Some(&p)) = (trips, pairs.first()) {
        return HandRank {
            category: HandCategory::FullHouse,
            tiebreakers: vec![t, p],
        };
    }
    if is_flush {
        return HandRank {
            category: HandCategory::Flush,
            tiebreakers: ranks,
        };
    }
    if is_straight || is_wheel {
        let high = if is_wheel { 5 } else { ranks[0] };
        return HandRank {
            category: HandCategory::Straight,
            tiebreakers: vec![high],
        };
    }
    if let Some(t) = trips {
        return HandRank {
            category: HandCategory::Trips,
            tiebreakers: vec![t, singles[0], singles[1]],
        };
    }
    if pairs.len() >= 2 {
        return HandRank {
            category: HandCategory::TwoPair,
            tiebreakers: vec![pairs[0], pairs[1], singles[0]],
        };
    }
    if let Some(&p) = pairs.first() {
        return HandRank {
            category: HandCategory::Pair,
            tiebreakers: vec![p, singles[0], singles[1], singles[2]],
        };
    }
    HandRank {
        category: HandCategory::HighCard,
        tiebreakers: ranks,
    }
}

/// Returns the seats holding the strongest hand (several on a genuine tie).
pub fn determine_winners(hands: &[(usize, HandRank)]) -> Vec<usize> {
    let best = match hands.iter().map(|(_, r)| r).max() {
        Some(best) => best.clone(),
        None => return vec![],
    };
    hands
        .iter()
        .filter(|(_, r)| *r == best)
        .map(|(seat, _)| *seat)
        .collect()
}
