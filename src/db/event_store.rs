//! Durable event log and snapshots.
//!
//! The log is append-only and keyed by (table, sequence); the dispatcher
//! writes events before acknowledging the command that produced them.
//! Snapshots hold the serialized table state after each completed hand.

use crate::db::DbPool;
use crate::events::{EventKind, StoredEvent};
use sqlx::Row;
use std::sync::Arc;

#[derive(Clone)]
pub struct EventStore {
    pool: DbPool,
}

impl EventStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Appends a batch of events atomically.
    pub async fn append(&self, table_id: &str, events: &[Arc<StoredEvent>]) -> Result<(), sqlx::Error> {
        if events.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for event in events {
            let payload = serde_json::to_string(&event.kind).map_err(|e| {
                sqlx::Error::Encode(Box::new(e))
            })?;
            sqlx::query(
                "INSERT INTO table_events (table_id, sequence, hand_number, timestamp_ms, payload)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(table_id)
            .bind(event.sequence as i64)
            .bind(event.hand_number as i64)
            .bind(event.timestamp_ms as i64)
            .bind(payload)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    /// Loads events with sequence strictly greater than `since`, in order.
    pub async fn load_since(
        &self,
        table_id: &str,
        since: u64,
    ) -> Result<Vec<Arc<StoredEvent>>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT sequence, hand_number, timestamp_ms, payload
             FROM table_events WHERE table_id = ? AND sequence > ?
             ORDER BY sequence ASC",
        )
        .bind(table_id)
        .bind(since as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let payload: String = row.get("payload");
            let kind: EventKind = serde_json::from_str(&payload)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            events.push(Arc::new(StoredEvent {
                sequence: row.get::<i64, _>("sequence") as u64,
                hand_number: row.get::<i64, _>("hand_number") as u64,
                timestamp_ms: row.get::<i64, _>("timestamp_ms") as u64,
                kind,
            }));
        }
        Ok(events)
    }

    /// Highest stored sequence for a table, 0 when the log is empty.
    pub async fn max_sequence(&self, table_id: &str) -> Result<u64, sqlx::Error> {
        let row = sqlx::query(
            "SELECT COALESCE(MAX(sequence), 0) AS max_seq FROM table_events WHERE table_id = ?",
        )
        .bind(table_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get::<i64, _>("max_seq") as u64)
    }

    /// Stores the latest snapshot for a table, replacing any prior one.
    pub async fn save_snapshot(
        &self,
        table_id: &str,
        sequence: u64,
        taken_at_ms: u64,
        state: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO table_snapshots (table_id, sequence, taken_at_ms, state)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(table_id) DO UPDATE SET
                 sequence = excluded.sequence,
                 taken_at_ms = excluded.taken_at_ms,
                 state = excluded.state",
        )
        .bind(table_id)
        .bind(sequence as i64)
        .bind(taken_at_ms as i64)
        .bind(state)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Loads the latest snapshot: (sequence it covers, serialized state).
    pub async fn load_snapshot(
        &self,
        table_id: &str,
    ) -> Result<Option<(u64, String)>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT sequence, state FROM table_snapshots WHERE table_id = ?",
        )
        .bind(table_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| (r.get::<i64, _>("sequence") as u64, r.get("state"))))
    }
}
