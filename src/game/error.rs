//! Game-related error types
//!
//! Using typed errors instead of String provides:
//! - Better error handling and matching
//! - Clearer API contracts
//! - Better debugging information

use std::fmt;

/// Errors that can occur during game operations
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    // Table errors
    TableFull,
    TableNotFound,
    TableClosed,
    SeatOccupied { seat: usize },

    // Player errors
    PlayerAlreadySeated,
    PlayerNotAtTable,
    InsufficientChips { required: i64, available: i64 },

    // Action errors
    NotYourTurn,
    CannotAct,
    CannotCheck { current_bet: i64 },
    RaiseTooSmall { min_raise_to: i64, attempted: i64 },
    RaiseTooLarge { max_raise_to: i64, attempted: i64 },
    BettingNotReopened,
    InvalidAction { reason: String },

    // Game state errors
    HandInProgress,
    HandNotInProgress,
    NotEnoughPlayers { required: usize, available: usize },
    NotAuthorized,

    // Card errors
    DeckExhausted { requested: usize, remaining: usize },
    InsufficientCards { got: usize },

    // Command validation (rejected at the dispatcher boundary)
    Malformed { reason: String },
    OutOfRange { what: String },

    // Infrastructure
    StorageUnavailable { detail: String },
    InvariantViolation { detail: String },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Table errors
            GameError::TableFull => write!(f, "Table is full"),
            GameError::TableNotFound => write!(f, "Table not found"),
            GameError::TableClosed => write!(f, "Table is closed"),
            GameError::SeatOccupied { seat } => {
                write!(f, "Seat {} is already occupied", seat)
            }

            // Player errors
            GameError::PlayerAlreadySeated => write!(f, "You are already at this table"),
            GameError::PlayerNotAtTable => write!(f, "You are not at this table"),
            GameError::InsufficientChips {
                required,
                available,
            } => {
                write!(
                    f,
                    "Not enough chips. Required: {}, Available: {}",
                    required, available
                )
            }

            // Action errors
            GameError::NotYourTurn => write!(f, "Not your turn"),
            GameError::CannotAct => write!(f, "You cannot act"),
            GameError::CannotCheck { current_bet } => {
                write!(f, "Cannot check, must call {} or raise", current_bet)
            }
            GameError::RaiseTooSmall {
                min_raise_to,
                attempted,
            } => {
                write!(
                    f,
                    "Raise to {} is too small. Minimum raise is to {}",
                    attempted, min_raise_to
                )
            }
            GameError::RaiseTooLarge {
                max_raise_to,
                attempted,
            } => {
                write!(
                    f,
                    "Raise to {} exceeds your stack. Maximum is all-in to {}",
                    attempted, max_raise_to
                )
            }
            GameError::BettingNotReopened => {
                write!(f, "Betting was not reopened; you may only call or fold")
            }
            GameError::InvalidAction { reason } => {
                write!(f, "Invalid action: {}", reason)
            }

            // Game state errors
            GameError::HandInProgress => {
                write!(f, "Cannot perform action while a hand is in progress")
            }
            GameError::HandNotInProgress => write!(f, "No hand is in progress"),
            GameError::NotEnoughPlayers {
                required,
                available,
            } => {
                write!(
                    f,
                    "Not enough players to start. Required: {}, available: {}",
                    required, available
                )
            }
            GameError::NotAuthorized => write!(f, "You are not allowed to do that"),

            // Card errors
            GameError::DeckExhausted {
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "Deck exhausted: requested {} cards, {} remaining",
                    requested, remaining
                )
            }
            GameError::InsufficientCards { got } => {
                write!(f, "Hand evaluation needs at least 5 cards, got {}", got)
            }

            // Command validation
            GameError::Malformed { reason } => write!(f, "Malformed command: {}", reason),
            GameError::OutOfRange { what } => write!(f, "Value out of range: {}", what),

            // Infrastructure
            GameError::StorageUnavailable { detail } => {
                write!(f, "Storage unavailable: {}", detail)
            }
            GameError::InvariantViolation { detail } => {
                write!(f, "Invariant violation: {}", detail)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;
