//! Subscriber event streams.
//!
//! A stream replays the durable log from a caller-supplied sequence number,
//! then follows the table's live broadcast. Delivery is at-least-once with
//! strictly increasing sequence numbers per stream; a consumer that lags
//! behind the broadcast buffer is transparently refilled from the store.

use crate::db::EventStore;
use crate::events::StoredEvent;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast;

pub struct EventStream {
    table_id: String,
    user_id: String,
    store: EventStore,
    backlog: VecDeque<Arc<StoredEvent>>,
    live: broadcast::Receiver<Arc<StoredEvent>>,
    last_sequence: u64,
}

impl EventStream {
    pub(crate) fn new(
        table_id: String,
        user_id: String,
        store: EventStore,
        backlog: Vec<Arc<StoredEvent>>,
        live: broadcast::Receiver<Arc<StoredEvent>>,
        since: u64,
    ) -> Self {
        Self {
            table_id,
            user_id,
            store,
            backlog: backlog.into(),
            live,
            last_sequence: since,
        }
    }

    /// Sequence number of the last event yielded (or the replay origin).
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Next event visible to this subscriber. Returns `None` once the table
    /// is gone and the log is drained.
    pub async fn next(&mut self) -> Option<Arc<StoredEvent>> {
        loop {
            if let Some(event) = self.backlog.pop_front() {
                if let Some(event) = self.admit(event) {
                    return Some(event);
                }
                continue;
            }

            match self.live.recv().await {
                Ok(event) => {
                    if let Some(event) = self.admit(event) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(
                        "Subscriber on {} lagged by {} events, refilling from the log",
                        self.table_id,
                        missed
                    );
                    match self.store.load_since(&self.table_id, self.last_sequence).await {
                        Ok(events) => self.backlog = events.into(),
                        Err(e) => {
                            tracing::error!("Failed to refill from the event log: {}", e);
                            return None;
                        }
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    // The actor is gone; drain anything persisted after the
                    // last delivery, then end the stream
                    match self.store.load_since(&self.table_id, self.last_sequence).await {
                        Ok(events) if !events.is_empty() => self.backlog = events.into(),
                        _ => return None,
                    }
                }
            }
        }
    }

    /// Deduplicates by sequence and applies per-user visibility.
    fn admit(&mut self, event: Arc<StoredEvent>) -> Option<Arc<StoredEvent>> {
        if event.sequence <= self.last_sequence {
            return None;
        }
        self.last_sequence = event.sequence;
        if event.kind.visible_to(&self.user_id) {
            Some(event)
        } else {
            None
        }
    }
}
