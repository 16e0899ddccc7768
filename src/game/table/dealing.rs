use super::*;
use crate::game::constants::{HOLE_CARDS_PER_PLAYER, MIN_PLAYERS_TO_START};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

impl PokerTable {
    /// Starts the next hand with a freshly shuffled deck.
    pub fn start_hand(&mut self) -> GameResult<()> {
        let mut rng = match self.rng_seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed.wrapping_add(self.hand_number)),
            None => ChaCha20Rng::from_entropy(),
        };
        let deck = Deck::shuffled(&mut rng);
        self.start_hand_with_deck(deck)
    }

    /// Starts the next hand from a caller-supplied deal order. Exists for
    /// deterministic replay and tests; `start_hand` is the normal entry.
    pub fn start_hand_with_deck(&mut self, deck: Deck) -> GameResult<()> {
        if self.lifecycle != TableLifecycle::Open {
            return Err(GameError::TableClosed);
        }
        if !matches!(self.phase, GamePhase::Lobby | GamePhase::Complete) {
            return Err(GameError::HandInProgress);
        }

        let playable = self
            .players
            .iter()
            .filter(|p| p.can_play_next_hand())
            .count();
        if playable < MIN_PLAYERS_TO_START {
            return Err(GameError::NotEnoughPlayers {
                required: MIN_PLAYERS_TO_START,
                available: playable,
            });
        }

        for player in &mut self.players {
            player.reset_for_new_hand();
        }
        self.clear_roles();

        self.hand_number += 1;
        self.deck = deck;
        self.burned_cards = 0;
        self.community_cards.clear();
        self.current_bet = 0;
        self.last_raise_increment = self.big_blind;

        // Rotate the button clockwise; the very first hand starts at the
        // lowest eligible seat.
        self.dealer_seat = if self.hand_number == 1 {
            self.first_seat_where(|p| p.can_act())
        } else {
            self.next_seat_where(self.dealer_seat, |p| p.can_act())
        }
        .ok_or(GameError::InvariantViolation {
            detail: "no eligible seat for the dealer button".to_string(),
        })?;
        if let Some(dealer) = self.player_mut(self.dealer_seat) {
            dealer.role = PlayerRole::Dealer;
        }

        self.record(EventKind::HandStarted {
            dealer_seat: self.dealer_seat,
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            seat_order: self.seat_order_from_dealer(),
        });

        let first_to_act = self.post_blinds()?;
        self.deal_hole_cards()?;
        self.try_transition(GamePhase::PreFlop)?;

        tracing::info!(
            "Hand {} started on {}: dealer seat {}, {} players dealt in",
            self.hand_number,
            self.table_id,
            self.dealer_seat,
            self.in_hand_count()
        );

        // A blind seat can be all-in from posting; skip seats that cannot act
        if self
            .player(first_to_act)
            .map(|p| p.can_act())
            .unwrap_or(false)
        {
            self.set_turn(first_to_act);
        } else if let Some(next) = self.next_to_act(first_to_act) {
            self.set_turn(next);
        } else {
            // Everyone is already all-in from the blinds
            self.end_betting_round()?;
        }

        self.verify_conservation()
    }

    /// Deals two cards to every player in the hand, one card per pass,
    /// starting left of the dealer.
    pub(crate) fn deal_hole_cards(&mut self) -> GameResult<()> {
        let order = self.seat_order_from_dealer();

        for _pass in 0..HOLE_CARDS_PER_PLAYER {
            for &seat in &order {
                let card = self.deck.draw()?;
                if let Some(player) = self.player_mut(seat) {
                    player.hole_cards.push(card);
                }
            }
        }

        for &seat in &order {
            let (user_id, cards) = match self.player(seat) {
                Some(p) => (p.user_id.clone(), p.hole_cards.clone()),
                None => continue,
            };
            self.record(EventKind::HoleCardsDealt {
                seat,
                user_id,
                cards,
            });
        }

        Ok(())
    }
}
