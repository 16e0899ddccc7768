//! Integration tests for the table dispatcher: actors, timers, event
//! streams, and snapshot restore, all against an in-memory database.

use holdem_engine::config::Config;
use holdem_engine::create_test_db;
use holdem_engine::db::EventStore;
use holdem_engine::events::{ActionKind, EventKind, StoredEvent};
use holdem_engine::game::{GameError, GamePhase, PlayerAction};
use holdem_engine::server::{CreateTable, TableCommand, TableHandle, TableRegistry};
use std::sync::Arc;
use std::time::Duration;

async fn registry() -> TableRegistry {
    let pool = create_test_db().await;
    TableRegistry::new(pool, Config::default())
}

fn create_request() -> CreateTable {
    CreateTable {
        owner_user_id: "p1".to_string(),
        max_players: 6,
        small_blind: 10,
        big_blind: 20,
    }
}

async fn join(handle: &TableHandle, user: &str, buy_in: i64) {
    handle
        .submit(TableCommand::Join {
            user_id: user.to_string(),
            buy_in,
        })
        .await
        .unwrap_or_else(|e| panic!("{} could not join: {}", user, e));
}

async fn start_hand(handle: &TableHandle) {
    handle
        .submit(TableCommand::StartHand {
            by_user_id: "p1".to_string(),
        })
        .await
        .expect("owner can start the hand");
}

/// Plays the current hand to completion with checks and calls.
async fn check_down(handle: &TableHandle) {
    for _ in 0..64 {
        let view = handle.project_view("observer").await.unwrap();
        if view.phase == GamePhase::Complete {
            return;
        }
        let seat = view.current_turn_seat.expect("a seat must be acting");
        let player = view
            .players
            .iter()
            .find(|p| p.seat == seat)
            .expect("acting seat is occupied");
        let action = if player.committed_this_round == view.current_bet {
            PlayerAction::Check
        } else {
            PlayerAction::Call
        };
        handle
            .submit(TableCommand::Action {
                user_id: player.user_id.clone(),
                action,
            })
            .await
            .expect("check/call is always legal in turn");
    }
    panic!("hand did not complete");
}

/// Drains a stream until HandComplete, returning everything seen.
async fn collect_hand(stream: &mut holdem_engine::server::EventStream) -> Vec<Arc<StoredEvent>> {
    let mut events = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("stream stalled")
            .expect("stream ended early");
        let done = matches!(event.kind, EventKind::HandComplete);
        events.push(event);
        if done {
            return events;
        }
    }
}

#[tokio::test]
async fn create_table_validates_inputs() {
    let registry = registry().await;

    let mut bad = create_request();
    bad.max_players = 12;
    assert!(matches!(
        registry.create_table(bad).await,
        Err(GameError::OutOfRange { .. })
    ));

    let mut bad = create_request();
    bad.big_blind = 25;
    assert!(matches!(
        registry.create_table(bad).await,
        Err(GameError::OutOfRange { .. })
    ));

    let handle = registry.create_table(create_request()).await.unwrap();
    assert!(registry.handle(handle.table_id()).await.is_ok());
    assert!(matches!(
        registry.handle("no-such-table").await,
        Err(GameError::TableNotFound)
    ));
}

#[tokio::test]
async fn join_buy_in_below_minimum_is_rejected_at_the_boundary() {
    let registry = registry().await;
    let handle = registry.create_table(create_request()).await.unwrap();

    let err = handle
        .submit(TableCommand::Join {
            user_id: "p2".to_string(),
            buy_in: 199,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::OutOfRange { .. }));
}

#[tokio::test]
async fn only_the_owner_may_start_without_auto_start() {
    let registry = registry().await;
    let handle = registry.create_table(create_request()).await.unwrap();
    join(&handle, "p1", 1000).await;
    join(&handle, "p2", 1000).await;

    let err = handle
        .submit(TableCommand::StartHand {
            by_user_id: "p2".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, GameError::NotAuthorized);

    start_hand(&handle).await;
    let view = handle.project_view("p1").await.unwrap();
    assert_eq!(view.phase, GamePhase::PreFlop);
}

// Write-ahead persistence: an acknowledged command's events are already in
// the durable log.
#[tokio::test]
async fn ack_implies_events_are_durable() {
    let pool = create_test_db().await;
    let registry = TableRegistry::new(pool.clone(), Config::default());
    let handle = registry.create_table(create_request()).await.unwrap();

    let ack = handle
        .submit(TableCommand::Join {
            user_id: "p1".to_string(),
            buy_in: 1000,
        })
        .await
        .unwrap();

    let store = EventStore::new(pool);
    let stored = store.load_since(handle.table_id(), 0).await.unwrap();
    assert!(
        stored.iter().any(|e| e.sequence == ack.last_sequence),
        "acked event not in the log"
    );
    assert!(store.max_sequence(handle.table_id()).await.unwrap() >= ack.last_sequence);
}

// S4: the acting player times out facing a bet and is auto-folded.
#[tokio::test(start_paused = true)]
async fn timeout_auto_folds_the_acting_player() {
    let registry = registry().await;
    let handle = registry.create_table(create_request()).await.unwrap();
    join(&handle, "p1", 1000).await;
    join(&handle, "p2", 1000).await;
    start_hand(&handle).await;

    // Heads-up: seat 0 (dealer, small blind) is to act and cannot check
    let view = handle.project_view("observer").await.unwrap();
    assert_eq!(view.current_turn_seat, Some(0));
    assert!(view.turn_deadline_ms.is_some());

    let mut stream = handle.subscribe("observer", Some(0)).await.unwrap();

    // Let the 30s deadline expire without input
    tokio::time::sleep(Duration::from_secs(35)).await;

    let events = collect_hand(&mut stream).await;
    let auto_fold = events.iter().find_map(|e| match &e.kind {
        EventKind::ActionTaken { seat, kind, .. } => Some((*seat, *kind)),
        _ => None,
    });
    assert_eq!(auto_fold, Some((0, ActionKind::Fold)));

    let view = handle.project_view("observer").await.unwrap();
    assert_eq!(view.phase, GamePhase::Complete);
    let winner = view.players.iter().find(|p| p.seat == 1).unwrap();
    assert_eq!(winner.stack, 1010);
}

// S5: a subscriber that disconnects and resubscribes from its last
// sequence sees exactly the continuation of the stream.
#[tokio::test]
async fn replay_resumes_without_gaps_or_duplicates() {
    let registry = registry().await;
    let handle = registry.create_table(create_request()).await.unwrap();

    let mut full = handle.subscribe("p1", Some(0)).await.unwrap();
    join(&handle, "p1", 1000).await;
    join(&handle, "p2", 1000).await;
    start_hand(&handle).await;
    check_down(&handle).await;

    let all_events = collect_hand(&mut full).await;
    assert!(all_events.len() > 6);
    // Sequences are strictly increasing on a single stream
    for pair in all_events.windows(2) {
        assert!(pair[1].sequence > pair[0].sequence);
    }

    // "Disconnect" partway through and resume from the last seen sequence
    let cut = all_events[all_events.len() / 2].sequence;
    let mut resumed = handle.subscribe("p1", Some(cut)).await.unwrap();
    let tail = collect_hand(&mut resumed).await;

    let expected: Vec<u64> = all_events
        .iter()
        .filter(|e| e.sequence > cut)
        .map(|e| e.sequence)
        .collect();
    let got: Vec<u64> = tail.iter().map(|e| e.sequence).collect();
    assert_eq!(got, expected, "resumed stream must continue exactly");

    // The events themselves match, not just the numbering
    for (a, b) in all_events.iter().filter(|e| e.sequence > cut).zip(tail.iter()) {
        assert_eq!(a.kind, b.kind);
    }
}

// Hole cards are delivered only to their owner; rejections only to their
// submitter.
#[tokio::test]
async fn private_events_are_scoped_to_their_owner() {
    let registry = registry().await;
    let handle = registry.create_table(create_request()).await.unwrap();

    let mut p1_stream = handle.subscribe("p1", Some(0)).await.unwrap();
    let mut p2_stream = handle.subscribe("p2", Some(0)).await.unwrap();

    join(&handle, "p1", 1000).await;
    join(&handle, "p2", 1000).await;
    start_hand(&handle).await;

    // Seat 1 tries to act out of turn; only p2's stream carries the rejection
    let err = handle
        .submit(TableCommand::Action {
            user_id: "p2".to_string(),
            action: PlayerAction::Fold,
        })
        .await
        .unwrap_err();
    assert_eq!(err, GameError::NotYourTurn);

    // Finish the hand so both streams terminate
    check_down(&handle).await;

    let p1_events = collect_hand(&mut p1_stream).await;
    let p2_events = collect_hand(&mut p2_stream).await;

    let hole_owners = |events: &[Arc<StoredEvent>]| -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::HoleCardsDealt { user_id, .. } => Some(user_id.clone()),
                _ => None,
            })
            .collect()
    };
    assert_eq!(hole_owners(&p1_events), vec!["p1".to_string()]);
    assert_eq!(hole_owners(&p2_events), vec!["p2".to_string()]);

    let saw_rejection = |events: &[Arc<StoredEvent>]| {
        events
            .iter()
            .any(|e| matches!(e.kind, EventKind::ActionRejected { .. }))
    };
    assert!(!saw_rejection(&p1_events));
    assert!(saw_rejection(&p2_events));
}

// Snapshot and restore: a closed table rehydrates with its full state and
// its event sequence continues where it left off.
#[tokio::test]
async fn snapshot_restore_preserves_state_and_sequences() {
    let pool = create_test_db().await;
    let registry = TableRegistry::new(pool.clone(), Config::default());
    let handle = registry.create_table(create_request()).await.unwrap();
    let table_id = handle.table_id().to_string();

    join(&handle, "p1", 1000).await;
    join(&handle, "p2", 1000).await;
    start_hand(&handle).await;

    // Seat 0 folds; seat 1 collects the blinds
    handle
        .submit(TableCommand::Action {
            user_id: "p1".to_string(),
            action: PlayerAction::Fold,
        })
        .await
        .unwrap();

    let store = EventStore::new(pool);
    let before = store.max_sequence(&table_id).await.unwrap();
    registry.close_table(&table_id).await.unwrap();
    assert!(matches!(
        registry.handle(&table_id).await,
        Err(GameError::TableNotFound)
    ));

    let restored = registry.restore_table(&table_id).await.unwrap();
    let view = restored.project_view("p1").await.unwrap();
    assert_eq!(view.phase, GamePhase::Complete);
    assert_eq!(view.hand_number, 1);
    let stacks: Vec<i64> = {
        let mut players = view.players.clone();
        players.sort_by_key(|p| p.seat);
        players.iter().map(|p| p.stack).collect()
    };
    assert_eq!(stacks, vec![990, 1010]);

    // The restored table keeps dealing: the next hand's events extend the log
    restored
        .submit(TableCommand::StartHand {
            by_user_id: "p1".to_string(),
        })
        .await
        .unwrap();
    let view = restored.project_view("p1").await.unwrap();
    assert_eq!(view.hand_number, 2);
    assert_eq!(view.dealer_seat, Some(1), "button rotates across restarts");
    assert!(store.max_sequence(&table_id).await.unwrap() > before);
}

// A closed table refuses commands.
#[tokio::test]
async fn closed_table_rejects_submissions() {
    let registry = registry().await;
    let handle = registry.create_table(create_request()).await.unwrap();
    let keep = handle.clone();
    registry.close_table(handle.table_id()).await.unwrap();

    let err = keep
        .submit(TableCommand::Join {
            user_id: "p2".to_string(),
            buy_in: 1000,
        })
        .await
        .unwrap_err();
    assert_eq!(err, GameError::TableClosed);
}

// Commands from concurrent callers are serialized per table; chips are
// conserved no matter the interleaving.
#[tokio::test]
async fn concurrent_submissions_are_serialized() {
    let registry = registry().await;
    let handle = registry.create_table(create_request()).await.unwrap();

    let mut joins = Vec::new();
    for i in 1..=6 {
        let handle = handle.clone();
        joins.push(tokio::spawn(async move {
            handle
                .submit(TableCommand::Join {
                    user_id: format!("p{}", i),
                    buy_in: 1000,
                })
                .await
        }));
    }
    for join in joins {
        join.await.unwrap().unwrap();
    }

    let view = handle.project_view("observer").await.unwrap();
    assert_eq!(view.players.len(), 6);
    let mut seats: Vec<usize> = view.players.iter().map(|p| p.seat).collect();
    seats.sort_unstable();
    seats.dedup();
    assert_eq!(seats.len(), 6, "every player holds a distinct seat");

    start_hand(&handle).await;
    check_down(&handle).await;
    let view = handle.project_view("observer").await.unwrap();
    let total: i64 = view.players.iter().map(|p| p.stack).sum();
    assert_eq!(total, 6000);
}
