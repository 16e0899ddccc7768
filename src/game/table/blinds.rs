use super::*;
use crate::game::constants::HEADS_UP_PLAYER_COUNT;

impl PokerTable {
    /// Posts the blinds for a freshly started hand and returns the first
    /// seat to act pre-flop. A blind seat that cannot cover the full amount
    /// posts short and is all-in for what it has.
    pub(crate) fn post_blinds(&mut self) -> GameResult<usize> {
        let dealt_in = self.in_hand_count();

        let (sb_seat, bb_seat, first_to_act) = if dealt_in == HEADS_UP_PLAYER_COUNT {
            // Heads-up: the dealer posts the small blind and acts first pre-flop
            let bb_seat = self
                .next_seat_where(self.dealer_seat, |p| p.is_in_hand())
                .ok_or(GameError::InvariantViolation {
                    detail: "heads-up hand without a second player".to_string(),
                })?;
            (self.dealer_seat, bb_seat, self.dealer_seat)
        } else {
            let sb_seat = self
                .next_seat_where(self.dealer_seat, |p| p.is_in_hand())
                .ok_or(GameError::InvariantViolation {
                    detail: "no small blind seat".to_string(),
                })?;
            let bb_seat = self
                .next_seat_where(sb_seat, |p| p.is_in_hand())
                .ok_or(GameError::InvariantViolation {
                    detail: "no big blind seat".to_string(),
                })?;
            let first = self
                .next_seat_where(bb_seat, |p| p.can_act())
                .ok_or(GameError::InvariantViolation {
                    detail: "no seat to act pre-flop".to_string(),
                })?;
            (sb_seat, bb_seat, first)
        };

        let small_blind = self.small_blind;
        let big_blind = self.big_blind;

        let sb_posted = match self.player_mut(sb_seat) {
            Some(player) => {
                if player.role != PlayerRole::Dealer {
                    player.role = PlayerRole::SmallBlind;
                }
                player.commit(small_blind)
            }
            None => 0,
        };
        self.record(EventKind::BlindPosted {
            seat: sb_seat,
            amount: sb_posted,
        });

        let bb_posted = match self.player_mut(bb_seat) {
            Some(player) => {
                player.role = PlayerRole::BigBlind;
                player.commit(big_blind)
            }
            None => 0,
        };
        self.record(EventKind::BlindPosted {
            seat: bb_seat,
            amount: bb_posted,
        });

        self.current_bet = big_blind;
        self.last_raise_increment = big_blind;

        tracing::info!(
            "Blinds posted on {}: dealer seat {}, SB seat {}, BB seat {}, first to act {}",
            self.table_id,
            self.dealer_seat,
            sb_seat,
            bb_seat,
            first_to_act
        );

        Ok(first_to_act)
    }
}
