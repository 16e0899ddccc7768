//! End-to-end hand scenarios driven directly against the table controller,
//! using stacked decks for deterministic deals.

use holdem_engine::events::EventKind;
use holdem_engine::game::{Card, Deck, GamePhase, PlayerAction, PlayerState, PokerTable};

const CLUBS: u8 = 0;
const DIAMONDS: u8 = 1;
const HEARTS: u8 = 2;
const SPADES: u8 = 3;

fn card(rank: u8, suit: u8) -> Card {
    Card::new(rank, suit)
}

/// Builds a full 52-card deck that deals the given cards first.
fn stacked_deck(front: &[Card]) -> Deck {
    let mut cards: Vec<Card> = front.to_vec();
    for suit in 0..4 {
        for rank in 2..=14 {
            let c = Card::new(rank, suit);
            if !front.contains(&c) {
                cards.push(c);
            }
        }
    }
    assert_eq!(cards.len(), 52, "stacked deck must still be a full deck");
    Deck::from_cards(cards)
}

fn new_table(blinds: (i64, i64)) -> PokerTable {
    PokerTable::new(
        "table-1".to_string(),
        "p1".to_string(),
        9,
        blinds.0,
        blinds.1,
    )
}

fn act(table: &mut PokerTable, seat: usize, action: PlayerAction) {
    let uid = table
        .public_state(None)
        .players
        .iter()
        .find(|p| p.seat == seat)
        .map(|p| p.user_id.clone())
        .expect("seat is occupied");
    table
        .handle_action(&uid, action)
        .unwrap_or_else(|e| panic!("action at seat {} rejected: {}", seat, e));
}

fn check_or_call(table: &mut PokerTable) {
    let view = table.public_state(None);
    let seat = view.current_turn_seat.expect("someone must be acting");
    let player = view.players.iter().find(|p| p.seat == seat).unwrap();
    let action = if player.committed_this_round == view.current_bet {
        PlayerAction::Check
    } else {
        PlayerAction::Call
    };
    act(table, seat, action);
}

fn stacks(table: &PokerTable) -> Vec<i64> {
    let mut players = table.public_state(None).players;
    players.sort_by_key(|p| p.seat);
    players.iter().map(|p| p.stack).collect()
}

// S1: heads-up, the big blind wins when the small blind folds pre-flop.
#[test]
fn heads_up_big_blind_wins_via_fold() {
    let mut table = new_table((10, 20)).with_rng_seed(1);
    table.seat_player("p1", 1000).unwrap();
    table.seat_player("p2", 1000).unwrap();

    table.start_hand().unwrap();
    assert_eq!(table.dealer_seat, 0);
    // Heads-up: the dealer posts the small blind and acts first pre-flop
    assert_eq!(table.current_turn_seat, Some(0));
    table.drain_events();

    act(&mut table, 0, PlayerAction::Fold);

    assert_eq!(table.phase, GamePhase::Complete);
    assert_eq!(stacks(&table), vec![990, 1010]);
    assert!(table.community_cards.is_empty(), "no flop on a fold win");

    let events = table.drain_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], EventKind::ActionTaken { seat: 0, .. }));
    assert!(matches!(events[1], EventKind::HandComplete));
}

// S2: three players check down to the river; the dealer's spade flush
// takes the pot at showdown.
#[test]
fn three_player_showdown_with_deterministic_deck() {
    let mut table = new_table((10, 20));
    table.seat_player("p1", 500).unwrap();
    table.seat_player("p2", 500).unwrap();
    table.seat_player("p3", 500).unwrap();

    // Dealer seat 0; dealing passes run seat 1, 2, 0.
    // Seat 0 gets As Ks, seat 1 gets 9h 9d, seat 2 gets 2c 7d.
    let deck = stacked_deck(&[
        card(9, HEARTS),
        card(2, CLUBS),
        card(14, SPADES),
        card(9, DIAMONDS),
        card(7, DIAMONDS),
        card(13, SPADES),
        // burn, flop
        card(2, DIAMONDS),
        card(12, SPADES),
        card(11, SPADES),
        card(2, SPADES),
        // burn, turn
        card(3, CLUBS),
        card(5, HEARTS),
        // burn, river
        card(4, CLUBS),
        card(3, DIAMONDS),
    ]);
    table.start_hand_with_deck(deck).unwrap();

    let p0 = table.public_state(Some("p1"));
    let me = p0.players.iter().find(|p| p.seat == 0).unwrap();
    assert_eq!(
        me.hole_cards,
        Some(vec![card(14, SPADES), card(13, SPADES)])
    );

    // Pre-flop: seat 0 raises to 60, the small blind calls, the big blind folds
    assert_eq!(table.current_turn_seat, Some(0));
    act(&mut table, 0, PlayerAction::Raise(60));
    act(&mut table, 1, PlayerAction::Call);
    act(&mut table, 2, PlayerAction::Fold);

    assert_eq!(table.phase, GamePhase::Flop);
    assert_eq!(table.pot_total(), 140);
    assert_eq!(
        table.community_cards,
        vec![card(12, SPADES), card(11, SPADES), card(2, SPADES)]
    );

    // Check down the flop, turn, and river
    for _ in 0..2 {
        check_or_call(&mut table);
    }
    assert_eq!(table.phase, GamePhase::Turn);
    assert_eq!(table.community_cards[3], card(5, HEARTS));
    for _ in 0..2 {
        check_or_call(&mut table);
    }
    assert_eq!(table.phase, GamePhase::River);
    assert_eq!(table.community_cards[4], card(3, DIAMONDS));
    table.drain_events();
    for _ in 0..2 {
        check_or_call(&mut table);
    }

    assert_eq!(table.phase, GamePhase::Complete);
    // Seat 0 wins 140 with the ace-high flush; seat 1's nines get nothing
    assert_eq!(stacks(&table), vec![580, 440, 480]);
    let total: i64 = stacks(&table).iter().sum();
    assert_eq!(total, 1500, "pot conservation");

    let events = table.drain_events();
    let showdown = events
        .iter()
        .find_map(|e| match e {
            EventKind::Showdown {
                hands,
                winners_per_pot,
                payouts,
            } => Some((hands, winners_per_pot, payouts)),
            _ => None,
        })
        .expect("a showdown event is emitted");
    assert_eq!(showdown.1, &vec![vec![0]]);
    assert_eq!(showdown.2.len(), 1);
    assert_eq!(showdown.2[0].seat, 0);
    assert_eq!(showdown.2[0].amount, 140);
    let winner_hand = showdown.0.iter().find(|h| h.seat == 0).unwrap();
    assert_eq!(winner_hand.description, "Flush, Ace High");
    // The folded player's cards stay hidden
    assert!(showdown.0.iter().all(|h| h.seat != 2));
}

// S3: a short stack goes all-in pre-flop; the callers build a side pot the
// short stack cannot win.
#[test]
fn side_pot_with_one_all_in() {
    let mut table = new_table((10, 20));
    table.seat_player("p1", 50).unwrap();
    table.seat_player("p2", 500).unwrap();
    table.seat_player("p3", 500).unwrap();

    // Seat 0 gets aces, seat 1 kings, seat 2 queens; the board misses everyone
    let deck = stacked_deck(&[
        card(13, SPADES),
        card(12, SPADES),
        card(14, SPADES),
        card(13, HEARTS),
        card(12, HEARTS),
        card(14, HEARTS),
        // burn, flop
        card(3, CLUBS),
        card(2, CLUBS),
        card(7, DIAMONDS),
        card(9, CLUBS),
        // burn, turn
        card(3, DIAMONDS),
        card(4, DIAMONDS),
        // burn, river
        card(3, HEARTS),
        card(8, DIAMONDS),
    ]);
    table.start_hand_with_deck(deck).unwrap();

    // Pre-flop: seat 0 shoves 50, seat 1 calls, seat 2 raises to 200, seat 1 calls
    act(&mut table, 0, PlayerAction::AllIn);
    assert_eq!(table.current_bet, 50);
    act(&mut table, 1, PlayerAction::Call);
    act(&mut table, 2, PlayerAction::Raise(200));
    act(&mut table, 1, PlayerAction::Call);

    assert_eq!(table.phase, GamePhase::Flop);
    assert_eq!(table.pot_total(), 450);
    assert_eq!(
        table.public_state(None)
            .players
            .iter()
            .find(|p| p.seat == 0)
            .unwrap()
            .state,
        PlayerState::AllIn
    );

    // Seats 1 and 2 check it down
    while table.phase.is_betting() {
        check_or_call(&mut table);
    }

    assert_eq!(table.phase, GamePhase::Complete);

    let events = table.drain_events();
    let (winners_per_pot, payouts) = events
        .iter()
        .find_map(|e| match e {
            EventKind::Showdown {
                winners_per_pot,
                payouts,
                ..
            } => Some((winners_per_pot, payouts)),
            _ => None,
        })
        .expect("a showdown event is emitted");

    // Main pot 150 to the all-in aces; side pot 300 to the kings
    assert_eq!(winners_per_pot, &vec![vec![0], vec![1]]);
    assert_eq!(payouts.len(), 2);
    assert_eq!(payouts[0].seat, 0);
    assert_eq!(payouts[0].amount, 150);
    assert_eq!(payouts[1].seat, 1);
    assert_eq!(payouts[1].amount, 300);

    assert_eq!(stacks(&table), vec![150, 600, 300]);
    let total: i64 = stacks(&table).iter().sum();
    assert_eq!(total, 1050, "pot conservation");
}

// An all-in pre-flop against a caller still deals the full board before
// showdown, with no betting in between.
#[test]
fn all_in_runs_out_the_board() {
    let mut table = new_table((10, 20)).with_rng_seed(21);
    table.seat_player("p1", 300).unwrap();
    table.seat_player("p2", 300).unwrap();
    table.start_hand().unwrap();

    act(&mut table, 0, PlayerAction::AllIn);
    act(&mut table, 1, PlayerAction::Call);

    assert_eq!(table.phase, GamePhase::Complete);
    assert_eq!(table.community_cards.len(), 5);
    assert_eq!(table.burned_cards, 3);
    let total: i64 = stacks(&table).iter().sum();
    assert_eq!(total, 600);
}

// Several hands in a row: the button rotates, chips are conserved, and the
// hand number advances.
#[test]
fn multi_hand_session_conserves_chips() {
    let mut table = new_table((10, 20)).with_rng_seed(99);
    table.seat_player("p1", 500).unwrap();
    table.seat_player("p2", 500).unwrap();
    table.seat_player("p3", 500).unwrap();

    let mut dealers = Vec::new();
    for hand in 1..=5 {
        table.start_hand().unwrap();
        assert_eq!(table.hand_number, hand);
        dealers.push(table.dealer_seat);

        while table.phase.is_betting() {
            check_or_call(&mut table);
        }
        assert_eq!(table.phase, GamePhase::Complete);

        let total: i64 = stacks(&table).iter().sum();
        assert_eq!(total, 1500, "chips conserved after hand {}", hand);
    }

    assert_eq!(dealers, vec![0, 1, 2, 0, 1]);
}

// The evaluator, pots, and controller agree on a split pot: both players
// play the board and the pot splits evenly.
#[test]
fn board_plays_splits_the_pot() {
    let mut table = new_table((10, 20));
    table.seat_player("p1", 500).unwrap();
    table.seat_player("p2", 500).unwrap();

    // Board is a broadway straight; both hole hands are irrelevant
    let deck = stacked_deck(&[
        // heads-up deal order: seat 1, seat 0, seat 1, seat 0
        card(2, CLUBS),
        card(3, CLUBS),
        card(2, DIAMONDS),
        card(3, DIAMONDS),
        // burn, flop
        card(6, CLUBS),
        card(14, SPADES),
        card(13, HEARTS),
        card(12, CLUBS),
        // burn, turn
        card(6, DIAMONDS),
        card(11, DIAMONDS),
        // burn, river
        card(6, HEARTS),
        card(10, SPADES),
    ]);
    table.start_hand_with_deck(deck).unwrap();

    while table.phase.is_betting() {
        check_or_call(&mut table);
    }

    assert_eq!(table.phase, GamePhase::Complete);
    assert_eq!(stacks(&table), vec![500, 500]);

    let events = table.drain_events();
    let winners = events.iter().find_map(|e| match e {
        EventKind::Showdown {
            winners_per_pot, ..
        } => Some(winners_per_pot.clone()),
        _ => None,
    });
    assert_eq!(winners, Some(vec![vec![0, 1]]));
    let straight = events
        .iter()
        .find_map(|e| match e {
            EventKind::Showdown { hands, .. } => {
                hands.first().map(|h| h.description.clone())
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(straight, "Straight, Ace High");
}
