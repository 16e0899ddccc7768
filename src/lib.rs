//! Hold'em Table Engine
//!
//! The core of a multiplayer no-limit Texas Hold'em server: per-table
//! actors drive the hand state machine (deal, betting streets, showdown),
//! enforce action legality and turn order, split pots for all-ins, and
//! publish an append-only event log to subscribers. Transports, auth, and
//! lobbies live outside this crate and talk to it through
//! [`server::TableRegistry`] and [`server::TableHandle`].

pub mod config;
pub mod db;
pub mod events;
pub mod game;
pub mod server;

/// Test helper to create an in-memory database and run migrations
pub async fn create_test_db() -> db::DbPool {
    let pool = sqlx::sqlite::SqlitePool::connect(":memory:")
        .await
        .expect("Failed to create in-memory database");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}
