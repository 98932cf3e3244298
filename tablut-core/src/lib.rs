//! Tablut Core - Game engine
//!
//! This crate provides the rules of Tablut:
//! - Board geometry (9x9 grid, castle and throne squares)
//! - Pieces, sides and results
//! - Game state, legal moves, captures and terminal detection
//! - The fixed move index shared with the oracle
//! - Oracle input encoding

pub mod board;
pub mod pieces;
pub mod game;
pub mod move_index;
pub mod encoding;
pub mod setup;
pub mod error;

// Re-exports for convenient access
pub use board::{Square, Direction, CASTLE, NUM_SQUARES, BOARD_SIZE};
pub use pieces::{Piece, Player, GameResult};
pub use game::{GameState, Move, MOVE_LOG_LEN};
pub use move_index::{MoveIndex, MOVE_INDEX_SIZE};
pub use encoding::{NetworkInput, NUM_PLANES};
pub use setup::{Setup, STARTING_DIAGRAM};
pub use error::GameError;
