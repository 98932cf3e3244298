//! Fixed enumeration of every structural slide on the board
//!
//! For each square in row-major order, ids are handed out to every other square
//! in the same row (ascending), then every other square in the same column
//! (ascending). The mapping depends on geometry alone, so every process builds
//! the same index.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::board::{all_squares, Square, BOARD_SIZE, NUM_SQUARES};
use crate::error::GameError;
use crate::game::Move;

/// Number of ids: every square reaches 8 row squares and 8 column squares
pub const MOVE_INDEX_SIZE: usize = NUM_SQUARES * 2 * (BOARD_SIZE - 1);

static GLOBAL: OnceLock<MoveIndex> = OnceLock::new();

/// Bijection between structural moves and dense ids
#[derive(Clone, Debug)]
pub struct MoveIndex {
    moves: Vec<Move>,
    ids: FxHashMap<Move, usize>,
}

impl MoveIndex {
    /// Process-wide shared index, built on first use
    pub fn global() -> &'static MoveIndex {
        GLOBAL.get_or_init(MoveIndex::build)
    }

    pub fn build() -> Self {
        let mut moves = Vec::with_capacity(MOVE_INDEX_SIZE);

        for from in all_squares() {
            let row_start = from.row() * BOARD_SIZE;
            let row = (row_start..row_start + BOARD_SIZE).map(|i| Square(i as u8));
            let col = (from.col()..NUM_SQUARES)
                .step_by(BOARD_SIZE)
                .map(|i| Square(i as u8));

            for to in row.chain(col) {
                if to != from {
                    moves.push(Move::new(from, to));
                }
            }
        }

        let ids = moves.iter().enumerate().map(|(id, &mv)| (mv, id)).collect();
        Self { moves, ids }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Id of a move; fails for anything that is not a same-row or same-column slide
    pub fn id(&self, mv: Move) -> Result<usize, GameError> {
        self.ids
            .get(&mv)
            .copied()
            .ok_or(GameError::MoveIndexNotFound { from: mv.from, to: mv.to })
    }

    /// Move with the given id
    pub fn get(&self, id: usize) -> Option<Move> {
        self.moves.get(id).copied()
    }

    /// Moves in id order
    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.moves.iter().copied()
    }
}
