//! Pot construction and payout.
//!
//! Pots are derived from each seat's total contribution to the hand: the
//! distinct contribution levels, ascending, slice the chips into layers.
//! Folded players' chips stay in the layers they reached but folded seats
//! can never win a layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    pub amount: i64,
    /// Seats eligible to win this pot
    pub eligible_seats: Vec<usize>,
}

/// Builds the main pot and side pots.
/// `contributions` holds (seat, committed_this_hand, eligible_to_win);
/// eligibility means the seat has not folded out of the hand.
pub fn build_pots(contributions: &[(usize, i64, bool)]) -> Vec<Pot> {
    let mut levels: Vec<i64> = contributions
        .iter()
        .map(|&(_, amount, _)| amount)
        .filter(|&amount| amount > 0)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots = Vec::new();
    let mut prev_level = 0i64;

    for level in levels {
        let layer: i64 = contributions
            .iter()
            .map(|&(_, amount, _)| amount.min(level) - amount.min(prev_level))
            .sum();
        let eligible: Vec<usize> = contributions
            .iter()
            .filter(|&&(_, amount, eligible)| eligible && amount >= level)
            .map(|&(seat, _, _)| seat)
            .collect();

        if layer > 0 {
            pots.push(Pot {
                amount: layer,
                eligible_seats: eligible,
            });
        }
        prev_level = level;
    }

    pots
}

/// Splits each pot equally among its winners. Odd chips go to the earliest
/// winner clockwise from the dealer button (the button itself pays last),
/// which keeps payouts reproducible.
/// Returns seat -> total amount won.
pub fn award_pots(
    pots: &[Pot],
    winners_by_pot: &[Vec<usize>],
    dealer_seat: usize,
    max_seats: usize,
) -> HashMap<usize, i64> {
    let mut payouts = HashMap::new();

    for (pot, winners) in pots.iter().zip(winners_by_pot.iter()) {
        if winners.is_empty() {
            continue;
        }

        let mut ordered = winners.clone();
        ordered.sort_unstable_by_key(|&seat| {
            (seat + max_seats - dealer_seat - 1) % max_seats
        });

        let share = pot.amount / ordered.len() as i64;
        let remainder = pot.amount % ordered.len() as i64;

        for (i, &seat) in ordered.iter().enumerate() {
            let amount = if (i as i64) < remainder {
                share + 1
            } else {
                share
            };
            *payouts.entry(seat).or_insert(0) += amount;
        }
    }

    payouts
}
