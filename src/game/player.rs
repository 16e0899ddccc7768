use crate::game::deck::Card;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Active,         // Still in the hand
    Folded,         // Folded this hand
    AllIn,          // All chips in the pot
    SittingOut,     // Not dealt into hands (broke, or leaving)
    WaitingForHand, // Joined mid-hand, waiting for the next hand to start
}

/// Positional role for the current hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRole {
    None,
    Dealer,
    SmallBlind,
    BigBlind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub user_id: String,
    pub seat: usize,
    pub stack: i64,
    pub hole_cards: Vec<Card>,
    pub committed_this_round: i64,
    pub committed_this_hand: i64,
    pub state: PlayerState,
    pub role: PlayerRole,
    pub has_acted_this_round: bool,
    /// Requested to leave; the seat is released once the hand completes.
    pub pending_leave: bool,
}

impl Player {
    pub fn new(user_id: String, seat: usize, stack: i64) -> Self {
        Self {
            user_id,
            seat,
            stack,
            hole_cards: vec![],
            committed_this_round: 0,
            committed_this_hand: 0,
            state: PlayerState::Active,
            role: PlayerRole::None,
            has_acted_this_round: false,
            pending_leave: false,
        }
    }

    /// Moves up to `amount` chips from the stack into the current round's
    /// commitment, clamped to the stack. Returns the chips actually moved.
    pub fn commit(&mut self, amount: i64) -> i64 {
        let actual = amount.min(self.stack);
        self.stack -= actual;
        self.committed_this_round += actual;
        self.committed_this_hand += actual;

        if self.stack == 0 && self.state == PlayerState::Active {
            self.state = PlayerState::AllIn;
        }

        actual
    }

    pub fn fold(&mut self) {
        self.state = PlayerState::Folded;
    }

    pub fn reset_for_new_round(&mut self) {
        self.committed_this_round = 0;
        self.has_acted_this_round = false;
    }

    pub fn reset_for_new_hand(&mut self) {
        self.hole_cards.clear();
        self.committed_this_round = 0;
        self.committed_this_hand = 0;
        self.has_acted_this_round = false;
        self.role = PlayerRole::None;

        if self.stack > 0 && self.state != PlayerState::SittingOut {
            self.state = PlayerState::Active;
        } else if self.stack == 0 {
            self.state = PlayerState::SittingOut;
        }
        // Voluntarily sitting out players stay sitting out
    }

    /// Eligible to act in the current betting round.
    pub fn can_act(&self) -> bool {
        matches!(self.state, PlayerState::Active)
    }

    /// Still competing for the pot (has not folded or left the hand).
    pub fn is_in_hand(&self) -> bool {
        matches!(self.state, PlayerState::Active | PlayerState::AllIn)
    }

    /// Can be dealt in when the next hand starts.
    pub fn can_play_next_hand(&self) -> bool {
        self.stack > 0 && self.state != PlayerState::SittingOut && !self.pending_leave
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "amount")]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    /// Raise-to: the new total commitment for this round.
    Raise(i64),
    AllIn,
}
