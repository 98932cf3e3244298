//! Error types for the game engine

use crate::board::Square;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Illegal move: {from} -> {to}")]
    IllegalMove { from: Square, to: Square },

    #[error("Move not in move index: {from} -> {to}")]
    MoveIndexNotFound { from: Square, to: Square },

    #[error("Invalid setup: {0}")]
    InvalidSetup(String),

    #[error("Setup parse failed: {0}")]
    Json(#[from] serde_json::Error),
}
