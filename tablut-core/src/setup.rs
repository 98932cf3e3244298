//! Starting position and text setups
//!
//! A diagram is nine rows of nine symbols: `.` empty, `W` defender,
//! `B` attacker, `K` King. Whitespace inside a row is ignored.

use serde::{Deserialize, Serialize};

use crate::board::{Square, BOARD_SIZE, NUM_SQUARES};
use crate::error::GameError;
use crate::game::GameState;
use crate::pieces::{Piece, Player};

/// Historical Tablut layout: 16 attackers, 8 defenders, King on the castle
pub const STARTING_DIAGRAM: [&str; BOARD_SIZE] = [
    "...BBB...",
    "....B....",
    "....W....",
    "B...W...B",
    "BBWWKWWBB",
    "B...W...B",
    "....W....",
    "....B....",
    "...BBB...",
];

/// Serializable position record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setup {
    pub rows: Vec<String>,
    pub turn: Player,
}

impl GameState {
    /// Tablut starting position, White to move
    pub fn starting_position() -> Self {
        Self::from_diagram(&STARTING_DIAGRAM, Player::White)
            .expect("starting diagram is well formed")
    }

    /// Build a position from a diagram.
    ///
    /// Rejects malformed rows, unknown symbols, more than one King and any
    /// non-King piece standing on the castle.
    pub fn from_diagram<S: AsRef<str>>(rows: &[S], turn: Player) -> Result<Self, GameError> {
        if rows.len() != BOARD_SIZE {
            return Err(GameError::InvalidSetup(format!(
                "expected {} rows, got {}",
                BOARD_SIZE,
                rows.len()
            )));
        }

        let mut board = [Piece::Empty; NUM_SQUARES];

        for (row, line) in rows.iter().enumerate() {
            let symbols: Vec<char> = line
                .as_ref()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if symbols.len() != BOARD_SIZE {
                return Err(GameError::InvalidSetup(format!(
                    "row {} has {} squares",
                    row,
                    symbols.len()
                )));
            }

            for (col, &c) in symbols.iter().enumerate() {
                let piece = Piece::from_symbol(c).ok_or_else(|| {
                    GameError::InvalidSetup(format!("unknown symbol '{}' at row {}", c, row))
                })?;
                board[row * BOARD_SIZE + col] = piece;
            }
        }

        let kings = board.iter().filter(|&&p| p == Piece::King).count();
        if kings > 1 {
            return Err(GameError::InvalidSetup(format!("{} kings on the board", kings)));
        }

        let castle = board[crate::board::CASTLE.index()];
        if castle == Piece::White || castle == Piece::Black {
            return Err(GameError::InvalidSetup(
                "only the King may stand on the castle".to_string(),
            ));
        }

        Ok(Self::new(board, turn))
    }

    /// Parse a JSON `Setup` record
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let setup: Setup = serde_json::from_str(json)?;
        Self::from_setup(&setup)
    }

    pub fn from_setup(setup: &Setup) -> Result<Self, GameError> {
        Self::from_diagram(setup.rows.as_slice(), setup.turn)
    }

    /// Diagram rows and side to move. The move log is not recorded.
    pub fn to_setup(&self) -> Setup {
        let rows = (0..BOARD_SIZE)
            .map(|row| {
                (0..BOARD_SIZE)
                    .map(|col| self.piece_at(Square((row * BOARD_SIZE + col) as u8)).symbol())
                    .collect()
            })
            .collect();

        Setup {
            rows,
            turn: self.turn(),
        }
    }
}
