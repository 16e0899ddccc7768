//! Game-related constants and default configuration values
//!
//! Centralizing these values makes it easier to:
//! - Adjust for testing
//! - Support future customization per-table

/// Default maximum number of seats at a table
pub const DEFAULT_MAX_SEATS: usize = 9;

/// Hard bounds on table size accepted at creation
pub const MIN_TABLE_SEATS: usize = 2;
pub const MAX_TABLE_SEATS: usize = 9;

/// Minimum players required to start a hand
pub const MIN_PLAYERS_TO_START: usize = 2;

/// Minimum buy-in, as a multiple of the big blind
pub const MIN_BUYIN_BB: i64 = 10;

/// Number of players for heads-up special blind/button rules
pub const HEADS_UP_PLAYER_COUNT: usize = 2;

/// Hole cards dealt to each player
pub const HOLE_CARDS_PER_PLAYER: usize = 2;

/// Community cards per street
pub const FLOP_CARDS: usize = 3;

/// Default per-turn deadline before the auto-action fires
pub const DEFAULT_TURN_TIMEOUT_MS: u64 = 30_000;

/// Broadcast channel capacity per table
pub const BROADCAST_CHANNEL_CAPACITY: usize = 256;

/// Mailbox capacity per table actor
pub const MAILBOX_CAPACITY: usize = 64;

/// How many times a failed event-log append is retried before the table freezes
pub const STORAGE_RETRY_LIMIT: u32 = 3;
