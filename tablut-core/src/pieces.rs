//! Pieces, sides and game outcomes

use serde::{Deserialize, Serialize};

/// Side to move. The King moves on White's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Defenders
    White,
    /// Attackers
    Black,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }
}

/// Contents of a board square
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Piece {
    #[default]
    Empty,
    White,
    Black,
    King,
}

impl Piece {
    pub fn is_empty(self) -> bool {
        self == Piece::Empty
    }

    /// Side that moves this piece
    pub fn owner(self) -> Option<Player> {
        match self {
            Piece::Empty => None,
            Piece::White | Piece::King => Some(Player::White),
            Piece::Black => Some(Player::Black),
        }
    }

    /// Diagram character: `.`, `W`, `B` or `K`
    pub fn symbol(self) -> char {
        match self {
            Piece::Empty => '.',
            Piece::White => 'W',
            Piece::Black => 'B',
            Piece::King => 'K',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '.' => Some(Piece::Empty),
            'W' => Some(Piece::White),
            'B' => Some(Piece::Black),
            'K' => Some(Piece::King),
            _ => None,
        }
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    WhiteWins,
    BlackWins,
    /// Repetition
    Draw,
}

impl GameResult {
    pub fn is_over(self) -> bool {
        self != GameResult::Ongoing
    }

    /// Winning side; None for a draw or an unfinished game
    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::WhiteWins => Some(Player::White),
            GameResult::BlackWins => Some(Player::Black),
            GameResult::Ongoing | GameResult::Draw => None,
        }
    }

    /// Terminal value from White's perspective
    pub fn value(self) -> Option<f32> {
        match self {
            GameResult::Ongoing => None,
            GameResult::WhiteWins => Some(1.0),
            GameResult::BlackWins => Some(-1.0),
            GameResult::Draw => Some(0.0),
        }
    }
}
