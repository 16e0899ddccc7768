mod actions;
mod blinds;
mod dealing;
mod phase;
mod player_mgmt;
mod showdown;
mod state;

pub use state::{PublicPlayerState, PublicTableState};

use crate::events::EventKind;
use crate::game::{
    constants::DEFAULT_TURN_TIMEOUT_MS,
    deck::{Card, Deck},
    error::{GameError, GameResult},
    player::{Player, PlayerRole, PlayerState},
};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current timestamp in milliseconds since UNIX epoch.
/// Returns 0 on system clock error (should never happen in practice).
pub(crate) fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_else(|e| {
            tracing::error!("System clock error: {}", e);
            0
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Lobby,    // Waiting for players / the first hand
    PreFlop,  // Hole cards dealt, pre-flop betting
    Flop,     // 3 community cards, betting
    Turn,     // 4th community card, betting
    River,    // 5th community card, betting
    Showdown, // Reveal and determine winners
    Complete, // Hand finished, awaiting the next StartHand
}

impl GamePhase {
    /// Returns the set of phases this phase can transition to.
    /// Betting phases can jump straight to Complete when everyone folds.
    pub fn valid_transitions(&self) -> &[GamePhase] {
        match self {
            GamePhase::Lobby => &[GamePhase::PreFlop],
            GamePhase::PreFlop => &[GamePhase::Flop, GamePhase::Showdown, GamePhase::Complete],
            GamePhase::Flop => &[GamePhase::Turn, GamePhase::Showdown, GamePhase::Complete],
            GamePhase::Turn => &[GamePhase::River, GamePhase::Showdown, GamePhase::Complete],
            GamePhase::River => &[GamePhase::Showdown, GamePhase::Complete],
            GamePhase::Showdown => &[GamePhase::Complete],
            GamePhase::Complete => &[GamePhase::PreFlop],
        }
    }

    /// Whether a betting round can be open in this phase.
    pub fn is_betting(&self) -> bool {
        matches!(
            self,
            GamePhase::PreFlop | GamePhase::Flop | GamePhase::Turn | GamePhase::River
        )
    }
}

/// Administrative state of a table, orthogonal to the hand phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableLifecycle {
    Open,
    /// Persistent storage failure; commands are refused
    Frozen,
    /// Invariant violation detected; quarantined pending operator intervention
    Corrupt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokerTable {
    pub table_id: String,
    pub owner_user_id: String,
    pub small_blind: i64,
    pub big_blind: i64,
    pub max_seats: usize,
    pub players: Vec<Player>,
    pub phase: GamePhase,
    pub lifecycle: TableLifecycle,
    pub community_cards: Vec<Card>,
    pub deck: Deck,
    pub burned_cards: usize,
    /// Seat holding the dealer button for the current hand
    pub dealer_seat: usize,
    pub current_turn_seat: Option<usize>,
    /// Absolute wall-clock deadline for the acting seat
    pub turn_deadline_ms: Option<u64>,
    pub turn_timeout_ms: u64,
    pub current_bet: i64,
    pub last_raise_increment: i64,
    pub hand_number: u64,
    /// Total chips sitting at the table; the conservation baseline
    pub chips_in_play: i64,
    /// Seed for per-hand deck shuffles; entropy-based when unset
    pub rng_seed: Option<u64>,
    /// Events produced by the last mutation, drained by the dispatcher
    #[serde(skip)]
    pending_events: Vec<EventKind>,
}

impl PokerTable {
    pub fn new(
        table_id: String,
        owner_user_id: String,
        max_seats: usize,
        small_blind: i64,
        big_blind: i64,
    ) -> Self {
        Self {
            table_id,
            owner_user_id,
            small_blind,
            big_blind,
            max_seats,
            players: Vec::new(),
            phase: GamePhase::Lobby,
            lifecycle: TableLifecycle::Open,
            community_cards: Vec::new(),
            deck: Deck::from_cards(Vec::new()),
            burned_cards: 0,
            dealer_seat: 0,
            current_turn_seat: None,
            turn_deadline_ms: None,
            turn_timeout_ms: DEFAULT_TURN_TIMEOUT_MS,
            current_bet: 0,
            last_raise_increment: big_blind,
            hand_number: 0,
            chips_in_play: 0,
            rng_seed: None,
            pending_events: Vec::new(),
        }
    }

    /// Fixes the shuffle seed, making every hand's deal reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub(crate) fn try_transition(&mut self, target: GamePhase) -> GameResult<()> {
        if self.phase.valid_transitions().contains(&target) {
            self.phase = target;
            Ok(())
        } else {
            tracing::error!(
                "Invalid phase transition: {:?} -> {:?} (valid: {:?})",
                self.phase,
                target,
                self.phase.valid_transitions()
            );
            Err(GameError::InvariantViolation {
                detail: format!("phase transition {:?} -> {:?}", self.phase, target),
            })
        }
    }

    // --- seat ring ---

    pub(crate) fn player(&self, seat: usize) -> Option<&Player> {
        self.players.iter().find(|p| p.seat == seat)
    }

    pub(crate) fn player_mut(&mut self, seat: usize) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.seat == seat)
    }

    pub(crate) fn seat_of_user(&self, user_id: &str) -> Option<usize> {
        self.players
            .iter()
            .find(|p| p.user_id == user_id)
            .map(|p| p.seat)
    }

    /// First occupied seat, scanning from seat 0, matching `eligible`.
    pub(crate) fn first_seat_where<F>(&self, mut eligible: F) -> Option<usize>
    where
        F: FnMut(&Player) -> bool,
    {
        (0..self.max_seats).find(|&seat| self.player(seat).map(&mut eligible).unwrap_or(false))
    }

    /// Next occupied seat clockwise after `after`, matching `eligible`.
    pub(crate) fn next_seat_where<F>(&self, after: usize, mut eligible: F) -> Option<usize>
    where
        F: FnMut(&Player) -> bool,
    {
        (1..=self.max_seats)
            .map(|offset| (after + offset) % self.max_seats)
            .find(|&seat| self.player(seat).map(&mut eligible).unwrap_or(false))
    }

    // --- counters ---

    pub(crate) fn in_hand_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_in_hand()).count()
    }

    pub(crate) fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.can_act()).count()
    }

    /// The aggregate of all chips committed during the current hand.
    pub fn pot_total(&self) -> i64 {
        self.players.iter().map(|p| p.committed_this_hand).sum()
    }

    /// The smallest total a raise may target right now.
    pub fn min_raise_to(&self) -> i64 {
        self.current_bet + self.last_raise_increment
    }

    // --- events & turn bookkeeping ---

    pub(crate) fn record(&mut self, kind: EventKind) {
        self.pending_events.push(kind);
    }

    /// Takes the events produced since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<EventKind> {
        std::mem::take(&mut self.pending_events)
    }

    pub(crate) fn set_turn(&mut self, seat: usize) {
        let deadline = current_timestamp_ms() + self.turn_timeout_ms;
        self.current_turn_seat = Some(seat);
        self.turn_deadline_ms = Some(deadline);
        self.record(EventKind::TurnChanged {
            seat,
            deadline_ms: deadline,
        });
    }

    pub(crate) fn clear_turn(&mut self) {
        self.current_turn_seat = None;
        self.turn_deadline_ms = None;
    }

    // --- invariants ---

    /// Pot conservation: every chip bought in is either in a stack or
    /// committed to the current hand. Checked after every mutation; a
    /// violation quarantines the table.
    pub(crate) fn verify_conservation(&mut self) -> GameResult<()> {
        let total: i64 = self
            .players
            .iter()
            .map(|p| p.stack + p.committed_this_hand)
            .sum();
        if total != self.chips_in_play {
            self.lifecycle = TableLifecycle::Corrupt;
            let detail = format!(
                "chip conservation broken: stacks+pot={} but chips_in_play={}",
                total, self.chips_in_play
            );
            tracing::error!("Table {} corrupt: {}", self.table_id, detail);
            self.record(EventKind::TableCorrupt {
                detail: detail.clone(),
            });
            return Err(GameError::InvariantViolation { detail });
        }
        Ok(())
    }

    /// Deck conservation: remaining + burned + community + hole cards is the
    /// full deck while a hand is live.
    pub fn deck_accounting(&self) -> (usize, usize, usize, usize) {
        let hole: usize = self.players.iter().map(|p| p.hole_cards.len()).sum();
        (
            self.deck.remaining(),
            self.burned_cards,
            self.community_cards.len(),
            hole,
        )
    }

    pub(crate) fn clear_roles(&mut self) {
        for player in &mut self.players {
            player.role = PlayerRole::None;
        }
    }

    /// Seats dealt into the hand, clockwise starting left of the dealer.
    pub(crate) fn seat_order_from_dealer(&self) -> Vec<usize> {
        let mut order = Vec::new();
        let mut seat = self.dealer_seat;
        for _ in 0..self.max_seats {
            seat = (seat + 1) % self.max_seats;
            if self.player(seat).map(|p| p.is_in_hand()).unwrap_or(false) {
                order.push(seat);
            }
        }
        order
    }
}
