pub mod constants;
pub mod deck;
pub mod error;
pub mod hand;
pub mod player;
pub mod pot;
pub mod table;

// Re-export commonly used items

// Table and game state
pub use table::{GamePhase, PokerTable, PublicPlayerState, PublicTableState, TableLifecycle};

// Player types
pub use player::{Player, PlayerAction, PlayerRole, PlayerState};

// Card and deck types
pub use deck::{Card, Deck};

// Hand evaluation
pub use hand::{determine_winners, evaluate_hand, HandCategory, HandRank};

// Errors
pub use error::{GameError, GameResult};
