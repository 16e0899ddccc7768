use super::*;
use crate::events::ActionKind;
use crate::game::player::PlayerAction;

impl PokerTable {
    /// Applies a player action. Rejected actions leave the table untouched.
    pub fn handle_action(&mut self, user_id: &str, action: PlayerAction) -> GameResult<()> {
        if self.lifecycle != TableLifecycle::Open {
            return Err(GameError::TableClosed);
        }
        if !self.phase.is_betting() {
            return Err(GameError::HandNotInProgress);
        }

        let seat = self
            .seat_of_user(user_id)
            .ok_or(GameError::PlayerNotAtTable)?;
        if self.current_turn_seat != Some(seat) {
            tracing::debug!(
                "Rejecting action from seat {}: turn belongs to {:?}",
                seat,
                self.current_turn_seat
            );
            return Err(GameError::NotYourTurn);
        }

        let (committed, stack, has_acted) = match self.player(seat) {
            Some(p) if p.can_act() => (p.committed_this_round, p.stack, p.has_acted_this_round),
            Some(_) => return Err(GameError::CannotAct),
            None => return Err(GameError::PlayerNotAtTable),
        };

        tracing::debug!(
            "handle_action: seat={}, action={:?}, committed={}, current_bet={}",
            seat,
            action,
            committed,
            self.current_bet
        );

        match action {
            PlayerAction::Fold => {
                if let Some(player) = self.player_mut(seat) {
                    player.fold();
                }
            }
            PlayerAction::Check => {
                if committed != self.current_bet {
                    return Err(GameError::CannotCheck {
                        current_bet: self.current_bet,
                    });
                }
            }
            PlayerAction::Call => {
                if self.current_bet <= committed {
                    return Err(GameError::InvalidAction {
                        reason: "nothing to call; check instead".to_string(),
                    });
                }
                let to_call = self.current_bet - committed;
                if let Some(player) = self.player_mut(seat) {
                    // Clamped to the stack; a short call puts the player all-in
                    player.commit(to_call);
                }
            }
            PlayerAction::Raise(amount) => {
                // Only players facing a full raise (or opening) may raise; a
                // short all-in leaves prior actors with call-or-fold only.
                if has_acted {
                    return Err(GameError::BettingNotReopened);
                }
                let max_to = committed + stack;
                if amount > max_to {
                    return Err(GameError::RaiseTooLarge {
                        max_raise_to: max_to,
                        attempted: amount,
                    });
                }
                let min_to = self.min_raise_to();
                if amount < min_to {
                    // An under-minimum raise is only legal as an explicit all-in
                    return Err(GameError::RaiseTooSmall {
                        min_raise_to: min_to,
                        attempted: amount,
                    });
                }

                let increment = amount - self.current_bet;
                if let Some(player) = self.player_mut(seat) {
                    player.commit(amount - committed);
                }
                self.last_raise_increment = increment;
                self.current_bet = amount;
                self.reopen_betting_except(seat);
            }
            PlayerAction::AllIn => {
                if stack == 0 {
                    return Err(GameError::CannotAct);
                }
                let new_total = committed + stack;
                if let Some(player) = self.player_mut(seat) {
                    player.commit(stack);
                }
                if new_total > self.current_bet {
                    let increment = new_total - self.current_bet;
                    if increment >= self.last_raise_increment {
                        // Full raise: reopens the betting
                        self.last_raise_increment = increment;
                        self.current_bet = new_total;
                        self.reopen_betting_except(seat);
                    } else {
                        // Short all-in: others must match it but prior
                        // actors may not re-raise
                        self.current_bet = new_total;
                    }
                }
            }
        }

        if let Some(player) = self.player_mut(seat) {
            player.has_acted_this_round = true;
        }

        let amount = match action {
            PlayerAction::Fold | PlayerAction::Check => 0,
            _ => self
                .player(seat)
                .map(|p| p.committed_this_round)
                .unwrap_or(0),
        };
        self.record(EventKind::ActionTaken {
            seat,
            kind: ActionKind::from(&action),
            amount,
            pot_total: self.pot_total(),
            current_bet: self.current_bet,
        });

        self.verify_conservation()?;
        self.advance_after_action(seat)
    }

    /// Synthesizes the auto-action for an expired turn deadline: a check
    /// when checking is legal, otherwise a fold. Emits the same ActionTaken
    /// event a user action would.
    pub fn handle_timeout(&mut self) -> GameResult<()> {
        let seat = self
            .current_turn_seat
            .ok_or(GameError::HandNotInProgress)?;
        let (user_id, committed) = match self.player(seat) {
            Some(p) => (p.user_id.clone(), p.committed_this_round),
            None => return Err(GameError::PlayerNotAtTable),
        };
        let action = if committed == self.current_bet {
            PlayerAction::Check
        } else {
            PlayerAction::Fold
        };
        tracing::info!(
            "Turn deadline expired on {}: seat {} auto-{:?}",
            self.table_id,
            seat,
            action
        );
        self.handle_action(&user_id, action)
    }

    fn reopen_betting_except(&mut self, seat: usize) {
        for player in &mut self.players {
            if player.seat != seat && player.can_act() {
                player.has_acted_this_round = false;
            }
        }
    }

    /// Moves the hand forward after an accepted action: ends the hand when
    /// one player remains, closes the round when everyone has matched, or
    /// passes the turn along.
    pub(crate) fn advance_after_action(&mut self, acted_seat: usize) -> GameResult<()> {
        if self.in_hand_count() == 1 {
            return self.award_fold_win();
        }

        if self.is_betting_round_complete() {
            self.end_betting_round()
        } else {
            let next = self
                .next_to_act(acted_seat)
                .ok_or(GameError::InvariantViolation {
                    detail: "open betting round with nobody to act".to_string(),
                })?;
            self.set_turn(next);
            Ok(())
        }
    }

    /// The next seat owed an action: active, and either yet to act or short
    /// of the current bet. Folded and all-in seats are skipped.
    pub(crate) fn next_to_act(&self, after: usize) -> Option<usize> {
        self.next_seat_where(after, |p| {
            p.can_act() && (!p.has_acted_this_round || p.committed_this_round < self.current_bet)
        })
    }

    /// A betting round is complete when every active player has acted and
    /// matched the current bet.
    pub(crate) fn is_betting_round_complete(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.can_act())
            .all(|p| p.has_acted_this_round && p.committed_this_round == self.current_bet)
    }
}
