//! Typed table events.
//!
//! Every accepted state transition is described by an `EventKind`; the
//! dispatcher wraps kinds into `StoredEvent`s with a per-table strictly
//! increasing sequence number, appends them to the durable log, and fans
//! them out to subscribers. Consumers deduplicate by sequence number.

use crate::game::deck::Card;
use crate::game::player::PlayerAction;
use serde::{Deserialize, Serialize};

/// The action kind carried on `ActionTaken` events. Auto-actions synthesized
/// on timeout use the same kinds as user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
}

impl From<&PlayerAction> for ActionKind {
    fn from(action: &PlayerAction) -> Self {
        match action {
            PlayerAction::Fold => ActionKind::Fold,
            PlayerAction::Check => ActionKind::Check,
            PlayerAction::Call => ActionKind::Call,
            PlayerAction::Raise(_) => ActionKind::Raise,
            PlayerAction::AllIn => ActionKind::AllIn,
        }
    }
}

/// A player's revealed hand at showdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowdownHand {
    pub seat: usize,
    pub user_id: String,
    pub hole_cards: Vec<Card>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatPayout {
    pub seat: usize,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EventKind {
    TableCreated {
        owner_user_id: String,
        max_seats: usize,
        small_blind: i64,
        big_blind: i64,
    },
    PlayerJoined {
        seat: usize,
        user_id: String,
        buy_in: i64,
    },
    PlayerLeft {
        seat: usize,
        user_id: String,
    },
    HandStarted {
        dealer_seat: usize,
        small_blind: i64,
        big_blind: i64,
        /// Occupied seats in acting order, starting left of the dealer
        seat_order: Vec<usize>,
    },
    /// Private: delivered only to the seat's owner
    HoleCardsDealt {
        seat: usize,
        user_id: String,
        cards: Vec<Card>,
    },
    BlindPosted {
        seat: usize,
        amount: i64,
    },
    ActionTaken {
        seat: usize,
        kind: ActionKind,
        /// The seat's total commitment for the round after the action
        amount: i64,
        pot_total: i64,
        current_bet: i64,
    },
    TurnChanged {
        seat: usize,
        deadline_ms: u64,
    },
    FlopRevealed {
        cards: Vec<Card>,
    },
    TurnRevealed {
        card: Card,
    },
    RiverRevealed {
        card: Card,
    },
    Showdown {
        hands: Vec<ShowdownHand>,
        winners_per_pot: Vec<Vec<usize>>,
        payouts: Vec<SeatPayout>,
    },
    HandComplete,
    TableClosed,
    /// Diagnostic emitted when the table is quarantined
    TableCorrupt {
        detail: String,
    },
    /// Unicast: delivered only to the submitter
    ActionRejected {
        user_id: String,
        reason: String,
    },
}

impl EventKind {
    /// Whether this event may be delivered to `user_id`'s stream.
    /// Hole cards and rejections are scoped to their owner; everything else
    /// is public.
    pub fn visible_to(&self, user_id: &str) -> bool {
        match self {
            EventKind::HoleCardsDealt { user_id: owner, .. } => owner == user_id,
            EventKind::ActionRejected { user_id: owner, .. } => owner == user_id,
            _ => true,
        }
    }
}

/// An event as it exists in the per-table append-only log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub sequence: u64,
    pub hand_number: u64,
    pub timestamp_ms: u64,
    pub kind: EventKind,
}
