//! Per-table actor.
//!
//! Each table runs on its own task owning the mailbox, the turn timer, and
//! the table state. Exactly one command is applied at a time; events are
//! persisted write-ahead before the command is acknowledged, then fanned
//! out to subscribers without blocking the mailbox.

use crate::db::EventStore;
use crate::events::{EventKind, StoredEvent};
use crate::game::constants::{BROADCAST_CHANNEL_CAPACITY, MAILBOX_CAPACITY, STORAGE_RETRY_LIMIT};
use crate::game::error::{GameError, GameResult};
use crate::game::table::{current_timestamp_ms, GamePhase, PokerTable, PublicTableState, TableLifecycle};
use crate::server::commands::{Ack, TableCommand};
use crate::server::subscription::EventStream;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

pub(crate) enum Envelope {
    Command {
        cmd: TableCommand,
        reply: oneshot::Sender<GameResult<Ack>>,
    },
    Project {
        user_id: String,
        reply: oneshot::Sender<PublicTableState>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Cheap, cloneable handle to one table's actor.
#[derive(Clone)]
pub struct TableHandle {
    table_id: String,
    tx: mpsc::Sender<Envelope>,
    store: EventStore,
    broadcast: broadcast::Sender<Arc<StoredEvent>>,
}

impl TableHandle {
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Submits a command. Commands are applied in arrival order, one at a
    /// time; the acknowledgement arrives only after the command's events
    /// are durably stored.
    pub async fn submit(&self, cmd: TableCommand) -> GameResult<Ack> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope::Command { cmd, reply })
            .await
            .map_err(|_| GameError::TableClosed)?;
        rx.await.map_err(|_| GameError::TableClosed)?
    }

    /// Current public projection for one user.
    pub async fn project_view(&self, user_id: &str) -> GameResult<PublicTableState> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope::Project {
                user_id: user_id.to_string(),
                reply,
            })
            .await
            .map_err(|_| GameError::TableClosed)?;
        rx.await.map_err(|_| GameError::TableClosed)
    }

    /// Opens an event stream for `user_id` starting after `since` (or after
    /// the latest snapshot when omitted). Never blocks command application.
    pub async fn subscribe(&self, user_id: &str, since: Option<u64>) -> GameResult<EventStream> {
        // Subscribe to the live feed before reading the backlog so nothing
        // can fall between the two; duplicates are filtered by sequence.
        let live = self.broadcast.subscribe();
        let since = match since {
            Some(seq) => seq,
            None => self
                .store
                .load_snapshot(&self.table_id)
                .await
                .map_err(|e| GameError::StorageUnavailable {
                    detail: e.to_string(),
                })?
                .map(|(seq, _)| seq)
                .unwrap_or(0),
        };
        let backlog = self
            .store
            .load_since(&self.table_id, since)
            .await
            .map_err(|e| GameError::StorageUnavailable {
                detail: e.to_string(),
            })?;
        Ok(EventStream::new(
            self.table_id.clone(),
            user_id.to_string(),
            self.store.clone(),
            backlog,
            live,
            since,
        ))
    }

    /// Stops the actor after it emits a final TableClosed event.
    pub async fn shutdown(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Envelope::Shutdown { reply }).await.is_ok() {
            let _ = rx.await;
        }
    }
}

pub(crate) struct TableActor {
    table: PokerTable,
    inbox: mpsc::Receiver<Envelope>,
    store: EventStore,
    broadcast: broadcast::Sender<Arc<StoredEvent>>,
    next_sequence: u64,
    auto_start: bool,
    /// (deadline_ms, task-clock instant) for the armed turn timer
    armed: Option<(u64, Instant)>,
}

impl TableActor {
    /// Spawns the actor task. `announce` emits the TableCreated event for
    /// freshly created tables; restores skip it.
    pub(crate) fn spawn(
        mut table: PokerTable,
        store: EventStore,
        next_sequence: u64,
        auto_start: bool,
        announce: bool,
    ) -> TableHandle {
        let (tx, inbox) = mpsc::channel(MAILBOX_CAPACITY);
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CHANNEL_CAPACITY);

        if announce {
            table.record(EventKind::TableCreated {
                owner_user_id: table.owner_user_id.clone(),
                max_seats: table.max_seats,
                small_blind: table.small_blind,
                big_blind: table.big_blind,
            });
        }

        let handle = TableHandle {
            table_id: table.table_id.clone(),
            tx,
            store: store.clone(),
            broadcast: broadcast_tx.clone(),
        };

        let actor = Self {
            table,
            inbox,
            store,
            broadcast: broadcast_tx,
            next_sequence,
            auto_start,
            armed: None,
        };
        tokio::spawn(actor.run());

        handle
    }

    async fn run(mut self) {
        tracing::info!("Table actor {} starting", self.table.table_id);
        if let Err(e) = self.flush_events().await {
            tracing::error!(
                "Table {} failed to persist its creation: {}",
                self.table.table_id,
                e
            );
        }

        loop {
            let deadline = self.turn_deadline_instant();
            tokio::select! {
                maybe = self.inbox.recv() => match maybe {
                    Some(envelope) => {
                        if self.handle(envelope).await {
                            break;
                        }
                    }
                    None => break,
                },
                _ = Self::sleep_until_deadline(deadline), if deadline.is_some() => {
                    self.on_turn_timeout().await;
                }
            }
        }
        tracing::info!("Table actor {} stopped", self.table.table_id);
    }

    async fn sleep_until_deadline(deadline: Option<Instant>) {
        if let Some(at) = deadline {
            sleep_until(at).await;
        }
    }

    /// Maps the table's absolute wall-clock deadline onto the task clock,
    /// re-arming only when the deadline value changes. Reconnects never
    /// extend a deadline because the wall-clock value is authoritative.
    fn turn_deadline_instant(&mut self) -> Option<Instant> {
        let deadline_ms = self.table.turn_deadline_ms?;
        if let Some((armed_ms, at)) = self.armed {
            if armed_ms == deadline_ms {
                return Some(at);
            }
        }
        let now_ms = current_timestamp_ms();
        let at = Instant::now() + Duration::from_millis(deadline_ms.saturating_sub(now_ms));
        self.armed = Some((deadline_ms, at));
        Some(at)
    }

    /// Returns true when the actor should stop.
    async fn handle(&mut self, envelope: Envelope) -> bool {
        match envelope {
            Envelope::Project { user_id, reply } => {
                let _ = reply.send(self.table.public_state(Some(&user_id)));
                false
            }
            Envelope::Command { cmd, reply } => {
                let result = self.apply_command(cmd).await;
                let _ = reply.send(result);
                false
            }
            Envelope::Shutdown { reply } => {
                self.table.record(EventKind::TableClosed);
                if let Err(e) = self.flush_events().await {
                    tracing::warn!(
                        "Table {} failed to persist TableClosed: {}",
                        self.table.table_id,
                        e
                    );
                }
                self.snapshot_if_due().await;
                let _ = reply.send(());
                true
            }
        }
    }

    async fn apply_command(&mut self, cmd: TableCommand) -> GameResult<Ack> {
        if self.table.lifecycle != TableLifecycle::Open {
            return Err(GameError::TableClosed);
        }

        // Structural validation rejects malformed commands before the
        // controller sees them
        cmd.validate(self.table.big_blind)?;

        let submitter = cmd.user_id().to_string();
        let result = match cmd {
            TableCommand::Join { user_id, buy_in } => {
                self.table.seat_player(&user_id, buy_in).map(|_| ())
            }
            TableCommand::Leave { user_id } => self.table.leave(&user_id),
            TableCommand::StartHand { by_user_id } => self.start_hand_authorized(&by_user_id),
            TableCommand::Action { user_id, action } => self.table.handle_action(&user_id, action),
        };

        match result {
            Ok(()) => {
                let last_sequence = self.flush_events().await?;
                self.snapshot_if_due().await;
                Ok(Ack { last_sequence })
            }
            Err(e @ GameError::InvariantViolation { .. }) => {
                // The controller already quarantined the table and queued a
                // diagnostic event; make a best effort to persist it
                if let Err(flush_err) = self.flush_events().await {
                    tracing::error!(
                        "Table {} could not persist its corruption diagnostic: {}",
                        self.table.table_id,
                        flush_err
                    );
                }
                Err(e)
            }
            Err(e) => {
                // Legality rejection: no state was mutated; the submitter
                // alone sees the rejection event
                self.table.record(EventKind::ActionRejected {
                    user_id: submitter,
                    reason: e.to_string(),
                });
                let _ = self.flush_events().await;
                Err(e)
            }
        }
    }

    fn start_hand_authorized(&mut self, by_user_id: &str) -> GameResult<()> {
        let allowed = by_user_id == self.table.owner_user_id
            || (self.auto_start && self.table.players.iter().any(|p| p.user_id == by_user_id));
        if !allowed {
            return Err(GameError::NotAuthorized);
        }
        self.table.start_hand()
    }

    async fn on_turn_timeout(&mut self) {
        self.armed = None;
        match self.table.handle_timeout() {
            Ok(()) => {
                if let Err(e) = self.flush_events().await {
                    tracing::error!(
                        "Table {} failed to persist auto-action events: {}",
                        self.table.table_id,
                        e
                    );
                    return;
                }
                self.snapshot_if_due().await;
            }
            Err(e) => {
                tracing::warn!(
                    "Table {} timeout produced no action: {}",
                    self.table.table_id,
                    e
                );
                let _ = self.flush_events().await;
            }
        }
    }

    /// Assigns sequence numbers to the pending events, appends them to the
    /// durable log (bounded retries, then the table freezes), and fans them
    /// out. Returns the last assigned sequence.
    async fn flush_events(&mut self) -> GameResult<u64> {
        let kinds = self.table.drain_events();
        if kinds.is_empty() {
            return Ok(self.next_sequence.saturating_sub(1));
        }

        let now = current_timestamp_ms();
        let hand_number = self.table.hand_number;
        let events: Vec<Arc<StoredEvent>> = kinds
            .into_iter()
            .map(|kind| {
                let event = StoredEvent {
                    sequence: self.next_sequence,
                    hand_number,
                    timestamp_ms: now,
                    kind,
                };
                self.next_sequence += 1;
                Arc::new(event)
            })
            .collect();

        let mut attempt = 0;
        loop {
            match self.store.append(&self.table.table_id, &events).await {
                Ok(()) => break,
                Err(e) if attempt < STORAGE_RETRY_LIMIT => {
                    attempt += 1;
                    tracing::warn!(
                        "Event append failed on {} (attempt {}): {}",
                        self.table.table_id,
                        attempt,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                Err(e) => {
                    self.table.lifecycle = TableLifecycle::Frozen;
                    tracing::error!(
                        "Table {} frozen: event log unavailable: {}",
                        self.table.table_id,
                        e
                    );
                    return Err(GameError::StorageUnavailable {
                        detail: e.to_string(),
                    });
                }
            }
        }

        for event in &events {
            // Send only fails when nobody is subscribed
            let _ = self.broadcast.send(event.clone());
        }
        Ok(self.next_sequence - 1)
    }

    /// Snapshots the full table state (deck cursor and timer deadline
    /// included) after each completed hand.
    async fn snapshot_if_due(&mut self) {
        if self.table.phase != GamePhase::Complete {
            return;
        }
        let state = match serde_json::to_string(&self.table) {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(
                    "Table {} state not serializable for snapshot: {}",
                    self.table.table_id,
                    e
                );
                return;
            }
        };
        let sequence = self.next_sequence.saturating_sub(1);
        if let Err(e) = self
            .store
            .save_snapshot(
                &self.table.table_id,
                sequence,
                current_timestamp_ms(),
                &state,
            )
            .await
        {
            tracing::warn!(
                "Snapshot failed on {} at sequence {}: {}",
                self.table.table_id,
                sequence,
                e
            );
        }
    }
}
