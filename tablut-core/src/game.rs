//! Game state, move generation, captures and terminal detection

use std::collections::VecDeque;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::board::{all_squares, edge_squares, Square, DIRECTIONS, NUM_SQUARES};
use crate::error::GameError;
use crate::move_index::MoveIndex;
use crate::pieces::{GameResult, Piece, Player};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Moves kept for repetition detection
pub const MOVE_LOG_LEN: usize = 6;

// ============================================================================
// MOVE
// ============================================================================

/// An orthogonal slide
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// A Tablut position (clone to branch)
#[derive(Clone, Debug)]
pub struct GameState {
    board: [Piece; NUM_SQUARES],
    turn: Player,
    /// Last applied moves, oldest first
    move_log: VecDeque<Move>,
    /// Legal moves for `board` and `turn`; reset on every mutation
    legal_moves: OnceLock<Vec<Move>>,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Position from a raw board. No validation; see `from_diagram` for checked setups.
    pub fn new(board: [Piece; NUM_SQUARES], turn: Player) -> Self {
        Self {
            board,
            turn,
            move_log: VecDeque::with_capacity(MOVE_LOG_LEN),
            legal_moves: OnceLock::new(),
        }
    }

    /// Board with no pieces, White to move
    pub fn empty() -> Self {
        Self::new([Piece::Empty; NUM_SQUARES], Player::White)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Side to move
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Piece on a square
    pub fn piece_at(&self, sq: Square) -> Piece {
        self.board[sq.index()]
    }

    /// Get the raw board, row-major
    pub fn board(&self) -> &[Piece; NUM_SQUARES] {
        &self.board
    }

    /// Recent moves, oldest first
    pub fn move_log(&self) -> impl Iterator<Item = Move> + '_ {
        self.move_log.iter().copied()
    }

    /// Square holding the King, if it is still on the board
    pub fn king_square(&self) -> Option<Square> {
        all_squares().find(|&sq| self.piece_at(sq) == Piece::King)
    }

    /// Number of squares holding `piece`
    pub fn count(&self, piece: Piece) -> usize {
        self.board.iter().filter(|&&p| p == piece).count()
    }

    /// Place a piece directly (setup helper). Clears the legal-move cache.
    pub fn set_piece(&mut self, sq: Square, piece: Piece) {
        self.board[sq.index()] = piece;
        self.legal_moves = OnceLock::new();
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Legal moves for the side to move, computed once per position
    pub fn generate_moves(&self) -> &[Move] {
        self.legal_moves.get_or_init(|| self.compute_moves())
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        self.generate_moves().contains(&mv)
    }

    fn compute_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();

        for from in all_squares() {
            let piece = self.piece_at(from);
            if piece.owner() != Some(self.turn) {
                continue;
            }
            let is_king = piece == Piece::King;

            for dir in DIRECTIONS {
                let mut current = from;
                while let Some(next) = current.step(dir) {
                    if !self.piece_at(next).is_empty() {
                        break; // Blocked
                    }
                    // Castle is skipped as a landing square but does not stop the ray
                    if is_king || !next.is_castle() {
                        moves.push(Move::new(from, next));
                    }
                    current = next;
                }
            }
        }

        moves
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Apply a move in place.
    ///
    /// No legality check is made: callers pass moves from `generate_moves`.
    /// Use `try_apply_move` to validate first.
    pub fn apply_move(&mut self, mv: Move) {
        if self.move_log.len() == MOVE_LOG_LEN {
            self.move_log.pop_front();
        }
        self.move_log.push_back(mv);

        self.board[mv.to.index()] = self.board[mv.from.index()];
        self.board[mv.from.index()] = Piece::Empty;

        for captured in self.find_captures(mv) {
            self.board[captured.index()] = Piece::Empty;
        }

        self.turn = self.turn.opponent();
        self.legal_moves = OnceLock::new();
    }

    /// Apply a move after checking it against the legal-move list
    pub fn try_apply_move(&mut self, mv: Move) -> Result<(), GameError> {
        if !self.is_legal(mv) {
            return Err(GameError::IllegalMove { from: mv.from, to: mv.to });
        }
        self.apply_move(mv);
        Ok(())
    }

    /// Squares captured by `mv`, which must already be on the board with the
    /// mover still to play.
    pub fn find_captures(&self, mv: Move) -> Vec<Square> {
        let mut captures = Vec::new();
        let mover = self.turn;
        let to = mv.to;

        let enemy = match mover {
            Player::White => Piece::Black,
            Player::Black => Piece::White,
        };

        // Ordinary two-sided flanking
        for dir in DIRECTIONS {
            let Some(enemy_sq) = to.step(dir) else { continue };
            let Some(anvil_sq) = enemy_sq.step(dir) else { continue };

            if !self.is_hostile_to(anvil_sq, mover) {
                continue;
            }

            let target = self.piece_at(enemy_sq);
            if target == enemy {
                captures.push(enemy_sq);
            } else if mover == Player::Black
                && target == Piece::King
                && !enemy_sq.is_throne_adjacent()
            {
                captures.push(enemy_sq);
            }
        }

        // On or beside the throne the King must be closed in on all four sides
        if mover == Player::Black {
            for dir in DIRECTIONS {
                let Some(king_sq) = to.step(dir) else { continue };
                if king_sq.is_throne_adjacent()
                    && self.piece_at(king_sq) == Piece::King
                    && self.king_enclosed(king_sq)
                {
                    captures.push(king_sq);
                }
            }
        }

        captures
    }

    /// Does `sq` act as the far side of a capture for `mover`?
    fn is_hostile_to(&self, sq: Square, mover: Player) -> bool {
        let piece = self.piece_at(sq);
        if sq.is_castle() && piece != Piece::King {
            return true;
        }
        piece.owner() == Some(mover)
    }

    fn king_enclosed(&self, king_sq: Square) -> bool {
        king_sq.neighbours().all(|sq| match self.piece_at(sq) {
            Piece::Black => true,
            Piece::Empty => sq.is_castle(),
            Piece::White | Piece::King => false,
        })
    }

    // ========================================================================
    // TERMINAL DETECTION
    // ========================================================================

    /// Game result for the current position
    pub fn result(&self) -> GameResult {
        if edge_squares().any(|sq| self.piece_at(sq) == Piece::King) {
            return GameResult::WhiteWins;
        }

        if self.king_square().is_none() {
            return GameResult::BlackWins;
        }

        if self.turn == Player::White && self.white_encircled() {
            return GameResult::BlackWins;
        }

        if self.is_repetition() {
            return GameResult::Draw;
        }

        GameResult::Ongoing
    }

    /// (is over, winner). The winner is None for a draw.
    pub fn is_terminal(&self) -> (bool, Option<Player>) {
        let result = self.result();
        (result.is_over(), result.winner())
    }

    /// True when no empty path links any White piece or the King to the edge.
    ///
    /// Flood fill from the perimeter through empty squares; reaching a White
    /// piece or the King disproves encirclement.
    pub fn white_encircled(&self) -> bool {
        let mut visited = [false; NUM_SQUARES];
        let mut stack = Vec::new();

        for sq in edge_squares() {
            match self.piece_at(sq) {
                Piece::White | Piece::King => return false,
                Piece::Empty => {
                    visited[sq.index()] = true;
                    stack.push(sq);
                }
                Piece::Black => {}
            }
        }

        while let Some(sq) = stack.pop() {
            for next in sq.neighbours() {
                if visited[next.index()] {
                    continue;
                }
                visited[next.index()] = true;

                match self.piece_at(next) {
                    Piece::White | Piece::King => return false,
                    Piece::Empty => stack.push(next),
                    Piece::Black => {}
                }
            }
        }

        true
    }

    /// The same pair of moves came round again after a full cycle
    fn is_repetition(&self) -> bool {
        self.move_log.len() == MOVE_LOG_LEN
            && self.move_log[0] == self.move_log[4]
            && self.move_log[1] == self.move_log[5]
    }

    // ========================================================================
    // MOVE INDEX
    // ========================================================================

    /// Oracle output id for a move
    pub fn network_output_index(&self, mv: Move) -> Result<usize, GameError> {
        MoveIndex::global().id(mv)
    }
}

// ============================================================================
// TESTS
// ============================================================================
