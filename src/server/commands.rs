use crate::game::constants::MIN_BUYIN_BB;
use crate::game::error::{GameError, GameResult};
use crate::game::player::PlayerAction;
use serde::{Deserialize, Serialize};

/// Commands accepted by a table actor. Structural validation happens here,
/// before the controller is ever invoked; the controller only sees
/// well-formed commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum TableCommand {
    Join {
        user_id: String,
        buy_in: i64,
    },
    Leave {
        user_id: String,
    },
    StartHand {
        by_user_id: String,
    },
    Action {
        user_id: String,
        action: PlayerAction,
    },
}

impl TableCommand {
    pub fn user_id(&self) -> &str {
        match self {
            TableCommand::Join { user_id, .. } => user_id,
            TableCommand::Leave { user_id } => user_id,
            TableCommand::StartHand { by_user_id } => by_user_id,
            TableCommand::Action { user_id, .. } => user_id,
        }
    }

    /// Boundary validation: shape and ranges only, no table state involved.
    pub fn validate(&self, big_blind: i64) -> GameResult<()> {
        if self.user_id().is_empty() {
            return Err(GameError::Malformed {
                reason: "empty user id".to_string(),
            });
        }
        match self {
            TableCommand::Join { buy_in, .. } => {
                let min = big_blind * MIN_BUYIN_BB;
                if *buy_in < min {
                    return Err(GameError::OutOfRange {
                        what: format!("buy-in {} below the minimum {}", buy_in, min),
                    });
                }
            }
            TableCommand::Action {
                action: PlayerAction::Raise(amount),
                ..
            } => {
                if *amount <= 0 {
                    return Err(GameError::Malformed {
                        reason: format!("raise amount must be positive, got {}", amount),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Acknowledgement for an accepted command: the sequence number of the last
/// event it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub last_sequence: u64,
}
