use super::*;
use crate::game::constants::FLOP_CARDS;

impl PokerTable {
    /// Closes a finished betting round: advances to the next street, runs
    /// the board out when no further betting is possible, or goes to
    /// showdown after the river.
    pub(crate) fn end_betting_round(&mut self) -> GameResult<()> {
        if self.phase == GamePhase::River {
            return self.enter_showdown();
        }
        if self.active_count() < 2 {
            // Everyone left is all-in (or one player has nothing to call):
            // deal the remaining streets and show down
            return self.run_out_board();
        }

        self.advance_street()?;

        let first = self
            .next_seat_where(self.dealer_seat, |p| p.can_act())
            .ok_or(GameError::InvariantViolation {
                detail: "no active seat to open the street".to_string(),
            })?;
        self.set_turn(first);
        Ok(())
    }

    /// Burns one card and deals the next street, resetting per-round state.
    fn advance_street(&mut self) -> GameResult<()> {
        for player in &mut self.players {
            player.reset_for_new_round();
        }
        self.current_bet = 0;
        self.last_raise_increment = self.big_blind;
        self.clear_turn();

        match self.phase {
            GamePhase::PreFlop => {
                self.burn_one()?;
                let cards = self.deck.draw_n(FLOP_CARDS)?;
                self.community_cards.extend_from_slice(&cards);
                self.record(EventKind::FlopRevealed { cards });
                self.try_transition(GamePhase::Flop)?;
            }
            GamePhase::Flop => {
                self.burn_one()?;
                let card = self.deck.draw()?;
                self.community_cards.push(card);
                self.record(EventKind::TurnRevealed { card });
                self.try_transition(GamePhase::Turn)?;
            }
            GamePhase::Turn => {
                self.burn_one()?;
                let card = self.deck.draw()?;
                self.community_cards.push(card);
                self.record(EventKind::RiverRevealed { card });
                self.try_transition(GamePhase::River)?;
            }
            _ => {
                return Err(GameError::InvariantViolation {
                    detail: format!("cannot deal a street from {:?}", self.phase),
                })
            }
        }

        tracing::info!(
            "Street dealt on {}: phase now {:?}, board {}",
            self.table_id,
            self.phase,
            self.community_cards
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        );
        Ok(())
    }

    fn burn_one(&mut self) -> GameResult<()> {
        self.deck.draw()?;
        self.burned_cards += 1;
        Ok(())
    }

    /// Deals every remaining street with no betting, then shows down.
    pub(crate) fn run_out_board(&mut self) -> GameResult<()> {
        while self.phase != GamePhase::River {
            self.advance_street()?;
        }
        self.enter_showdown()
    }
}
