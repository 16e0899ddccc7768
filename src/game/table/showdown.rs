use super::*;
use crate::events::{SeatPayout, ShowdownHand};
use crate::game::hand::{determine_winners, evaluate_hand, HandRank};
use crate::game::pot::{award_pots, build_pots};

impl PokerTable {
    /// Reveals the remaining hands, builds the pots, and pays the winners.
    pub(crate) fn enter_showdown(&mut self) -> GameResult<()> {
        self.try_transition(GamePhase::Showdown)?;
        self.clear_turn();

        let mut hands: Vec<(usize, HandRank)> = Vec::new();
        let mut revealed: Vec<ShowdownHand> = Vec::new();
        for seat in 0..self.max_seats {
            let player = match self.player(seat) {
                Some(p) if p.is_in_hand() => p,
                _ => continue,
            };
            let mut cards = player.hole_cards.clone();
            cards.extend_from_slice(&self.community_cards);
            let rank = evaluate_hand(&cards)?;
            revealed.push(ShowdownHand {
                seat,
                user_id: player.user_id.clone(),
                hole_cards: player.hole_cards.clone(),
                description: rank.describe(),
            });
            hands.push((seat, rank));
        }

        let contributions: Vec<(usize, i64, bool)> = self
            .players
            .iter()
            .filter(|p| p.committed_this_hand > 0)
            .map(|p| (p.seat, p.committed_this_hand, p.is_in_hand()))
            .collect();
        let pots = build_pots(&contributions);

        let winners_per_pot: Vec<Vec<usize>> = pots
            .iter()
            .map(|pot| {
                let eligible: Vec<(usize, HandRank)> = hands
                    .iter()
                    .filter(|(seat, _)| pot.eligible_seats.contains(seat))
                    .cloned()
                    .collect();
                determine_winners(&eligible)
            })
            .collect();

        let payouts = award_pots(&pots, &winners_per_pot, self.dealer_seat, self.max_seats);

        // No chips may be created or destroyed by the payout
        let pot_total = self.pot_total();
        let paid: i64 = payouts.values().sum();
        if paid != pot_total {
            self.lifecycle = TableLifecycle::Corrupt;
            let detail = format!(
                "payout {} does not match pot {} on hand {}",
                paid, pot_total, self.hand_number
            );
            tracing::error!("Table {} corrupt: {}", self.table_id, detail);
            self.record(EventKind::TableCorrupt {
                detail: detail.clone(),
            });
            return Err(GameError::InvariantViolation { detail });
        }

        let mut payout_list: Vec<SeatPayout> = payouts
            .iter()
            .map(|(&seat, &amount)| SeatPayout { seat, amount })
            .collect();
        payout_list.sort_unstable_by_key(|p| p.seat);

        for (&seat, &amount) in &payouts {
            if let Some(player) = self.player_mut(seat) {
                player.stack += amount;
            }
        }
        for player in &mut self.players {
            player.committed_this_hand = 0;
            player.committed_this_round = 0;
        }

        tracing::info!(
            "Showdown on {} hand {}: {} pot(s), payouts {:?}",
            self.table_id,
            self.hand_number,
            pots.len(),
            payout_list
        );

        self.record(EventKind::Showdown {
            hands: revealed,
            winners_per_pot,
            payouts: payout_list,
        });
        self.complete_hand()
    }

    /// Ends the hand immediately when a single player remains: they collect
    /// the whole pot and nothing is revealed.
    pub(crate) fn award_fold_win(&mut self) -> GameResult<()> {
        let winner_seat = self
            .first_seat_where(|p| p.is_in_hand())
            .ok_or(GameError::InvariantViolation {
                detail: "fold-win with no player left in the hand".to_string(),
            })?;
        let total = self.pot_total();

        if let Some(player) = self.player_mut(winner_seat) {
            player.stack += total;
        }
        for player in &mut self.players {
            player.committed_this_hand = 0;
            player.committed_this_round = 0;
        }

        tracing::info!(
            "Hand {} on {} over: seat {} wins {} uncontested",
            self.hand_number,
            self.table_id,
            winner_seat,
            total
        );

        self.clear_turn();
        self.complete_hand()
    }

    /// Final bookkeeping shared by showdown and fold wins.
    fn complete_hand(&mut self) -> GameResult<()> {
        self.try_transition(GamePhase::Complete)?;
        self.record(EventKind::HandComplete);
        self.verify_conservation()?;
        self.release_pending_leaves();
        Ok(())
    }
}
