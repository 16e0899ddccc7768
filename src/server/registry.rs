//! Shared table registry.
//!
//! The registry is the only state shared across tables: a map from table id
//! to actor handle, touched only for coarse lookup and insert. All game
//! mutation happens inside the per-table actors.

use crate::config::Config;
use crate::db::{DbPool, EventStore};
use crate::game::constants::{MAX_TABLE_SEATS, MIN_TABLE_SEATS};
use crate::game::error::{GameError, GameResult};
use crate::game::table::PokerTable;
use crate::server::actor::{TableActor, TableHandle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTable {
    pub owner_user_id: String,
    pub max_players: usize,
    pub small_blind: i64,
    pub big_blind: i64,
}

impl CreateTable {
    fn validate(&self) -> GameResult<()> {
        if self.owner_user_id.is_empty() {
            return Err(GameError::Malformed {
                reason: "empty owner user id".to_string(),
            });
        }
        if !(MIN_TABLE_SEATS..=MAX_TABLE_SEATS).contains(&self.max_players) {
            return Err(GameError::OutOfRange {
                what: format!(
                    "max_players {} not in [{}..{}]",
                    self.max_players, MIN_TABLE_SEATS, MAX_TABLE_SEATS
                ),
            });
        }
        if self.small_blind <= 0 || self.big_blind != self.small_blind * 2 {
            return Err(GameError::OutOfRange {
                what: format!(
                    "blinds {}/{} (big blind must be twice the small blind)",
                    self.small_blind, self.big_blind
                ),
            });
        }
        Ok(())
    }
}

pub struct TableRegistry {
    store: EventStore,
    config: Config,
    tables: RwLock<HashMap<String, TableHandle>>,
}

impl TableRegistry {
    pub fn new(pool: DbPool, config: Config) -> Self {
        Self {
            store: EventStore::new(pool),
            config,
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a table and spawns its actor.
    pub async fn create_table(&self, req: CreateTable) -> GameResult<TableHandle> {
        self.create_table_seeded(req, None).await
    }

    /// Creates a table with a fixed shuffle seed, making every hand's deal
    /// reproducible. Used for replay and testing.
    pub async fn create_table_seeded(
        &self,
        req: CreateTable,
        rng_seed: Option<u64>,
    ) -> GameResult<TableHandle> {
        req.validate()?;

        let table_id = Uuid::new_v4().to_string();
        let mut table = PokerTable::new(
            table_id.clone(),
            req.owner_user_id.clone(),
            req.max_players,
            req.small_blind,
            req.big_blind,
        );
        table.turn_timeout_ms = self.config.turn_timeout_ms;
        if let Some(seed) = rng_seed {
            table = table.with_rng_seed(seed);
        }

        let handle = TableActor::spawn(table, self.store.clone(), 1, self.config.auto_start, true);
        self.tables
            .write()
            .await
            .insert(table_id.clone(), handle.clone());

        tracing::info!(
            "Created table {} for {} ({} seats, blinds {}/{})",
            table_id,
            req.owner_user_id,
            req.max_players,
            req.small_blind,
            req.big_blind
        );
        Ok(handle)
    }

    /// Looks up a live table.
    pub async fn handle(&self, table_id: &str) -> GameResult<TableHandle> {
        self.tables
            .read()
            .await
            .get(table_id)
            .cloned()
            .ok_or(GameError::TableNotFound)
    }

    /// Rehydrates a table from its latest snapshot and spawns a fresh
    /// actor. Event sequence numbers continue from the durable log, so
    /// subscribers can replay across the restart.
    pub async fn restore_table(&self, table_id: &str) -> GameResult<TableHandle> {
        let (_, state) = self
            .store
            .load_snapshot(table_id)
            .await
            .map_err(|e| GameError::StorageUnavailable {
                detail: e.to_string(),
            })?
            .ok_or(GameError::TableNotFound)?;
        let table: PokerTable =
            serde_json::from_str(&state).map_err(|e| GameError::StorageUnavailable {
                detail: format!("snapshot for {} is unreadable: {}", table_id, e),
            })?;

        let next_sequence = self
            .store
            .max_sequence(table_id)
            .await
            .map_err(|e| GameError::StorageUnavailable {
                detail: e.to_string(),
            })?
            + 1;

        let handle = TableActor::spawn(
            table,
            self.store.clone(),
            next_sequence,
            self.config.auto_start,
            false,
        );
        self.tables
            .write()
            .await
            .insert(table_id.to_string(), handle.clone());

        tracing::info!(
            "Restored table {} from snapshot, next sequence {}",
            table_id,
            next_sequence
        );
        Ok(handle)
    }

    /// Closes a table: emits TableClosed, stops the actor, and drops the
    /// handle. In-flight submitters receive TableClosed errors.
    pub async fn close_table(&self, table_id: &str) -> GameResult<()> {
        let handle = self
            .tables
            .write()
            .await
            .remove(table_id)
            .ok_or(GameError::TableNotFound)?;
        handle.shutdown().await;
        Ok(())
    }
}
