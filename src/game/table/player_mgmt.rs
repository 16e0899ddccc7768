use super::*;
use crate::events::ActionKind;

impl PokerTable {
    /// Seats a player at the first free seat. Joining mid-hand leaves the
    /// player waiting until the next hand starts.
    pub fn seat_player(&mut self, user_id: &str, buy_in: i64) -> GameResult<usize> {
        if self.lifecycle != TableLifecycle::Open {
            return Err(GameError::TableClosed);
        }
        if self.seat_of_user(user_id).is_some() {
            return Err(GameError::PlayerAlreadySeated);
        }
        if self.players.len() >= self.max_seats {
            return Err(GameError::TableFull);
        }

        let seat = self
            .first_free_seat()
            .ok_or(GameError::TableFull)?;
        let mut player = Player::new(user_id.to_string(), seat, buy_in);

        if !matches!(self.phase, GamePhase::Lobby | GamePhase::Complete) {
            player.state = PlayerState::WaitingForHand;
            tracing::debug!(
                "Player {} joining {} mid-hand, waiting for the next hand",
                user_id,
                self.table_id
            );
        }

        self.chips_in_play += buy_in;
        self.players.push(player);
        self.record(EventKind::PlayerJoined {
            seat,
            user_id: user_id.to_string(),
            buy_in,
        });
        Ok(seat)
    }

    fn first_free_seat(&self) -> Option<usize> {
        (0..self.max_seats).find(|&seat| self.player(seat).is_none())
    }

    /// Removes a player. Leaving mid-hand folds the player out of the hand
    /// and releases the seat once the hand completes; otherwise the seat is
    /// released immediately.
    pub fn leave(&mut self, user_id: &str) -> GameResult<()> {
        let seat = self
            .seat_of_user(user_id)
            .ok_or(GameError::PlayerNotAtTable)?;

        let in_live_hand = self.phase.is_betting()
            && self.player(seat).map(|p| p.is_in_hand()).unwrap_or(false);

        if !in_live_hand {
            self.remove_seat(seat);
            return Ok(());
        }

        let was_turn = self.current_turn_seat == Some(seat);
        let was_active = self.player(seat).map(|p| p.can_act()).unwrap_or(false);
        if let Some(player) = self.player_mut(seat) {
            player.pending_leave = true;
        }
        tracing::info!(
            "Player {} leaving {} mid-hand (seat {}), released after the hand",
            user_id,
            self.table_id,
            seat
        );

        // An all-in leaver stays in contention for the pot; an active one is
        // folded out on the spot.
        if was_active {
            if let Some(player) = self.player_mut(seat) {
                player.fold();
            }
            self.record(EventKind::ActionTaken {
                seat,
                kind: ActionKind::Fold,
                amount: 0,
                pot_total: self.pot_total(),
                current_bet: self.current_bet,
            });

            if self.in_hand_count() == 1 {
                return self.award_fold_win();
            }
            if was_turn {
                return self.advance_after_action(seat);
            }
            if self.is_betting_round_complete() {
                return self.end_betting_round();
            }
        }
        Ok(())
    }

    fn remove_seat(&mut self, seat: usize) {
        if let Some(idx) = self.players.iter().position(|p| p.seat == seat) {
            let player = self.players.remove(idx);
            self.chips_in_play -= player.stack;
            self.record(EventKind::PlayerLeft {
                seat,
                user_id: player.user_id.clone(),
            });
            tracing::info!(
                "Player {} left {} (seat {}), taking {} chips",
                player.user_id,
                self.table_id,
                seat,
                player.stack
            );
        }
    }

    /// Releases seats whose players asked to leave during the hand.
    pub(crate) fn release_pending_leaves(&mut self) {
        let leaving: Vec<usize> = self
            .players
            .iter()
            .filter(|p| p.pending_leave)
            .map(|p| p.seat)
            .collect();
        for seat in leaving {
            self.remove_seat(seat);
        }
    }
}
