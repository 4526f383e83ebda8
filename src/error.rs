//! Crate error type
//!
//! Only structural problems are errors: bad level data, a level index that
//! does not exist, or a level definition handed to the wrong engine.
//! Gameplay failures (illegal moves, stalls) are reported as notice events,
//! and a corrupt persisted ledger fails open to defaults.

use thiserror::Error;

use crate::ledger::GameId;

/// Errors surfaced by the arcade core
#[derive(Error, Debug)]
pub enum VaultError {
    /// Level-document parse failure
    #[error("level data error: {0}")]
    Json(#[from] serde_json::Error),

    /// Level index out of range for a game
    #[error("game {game} has no level {index}")]
    MissingLevel { game: GameId, index: usize },

    /// A level document parsed but its values cannot be played
    #[error("game {game} level {index}: {reason}")]
    InvalidLevel {
        game: GameId,
        index: usize,
        reason: &'static str,
    },

    /// A `LevelDef` variant was dispatched to the wrong engine
    #[error("level definition is not a {expected} level")]
    LevelMismatch { expected: &'static str },
}

/// Result alias for arcade core operations
pub type Result<T> = std::result::Result<T, VaultError>;
