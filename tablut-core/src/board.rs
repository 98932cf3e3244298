//! Tablut board geometry on a 9x9 grid, squares indexed row-major

use std::fmt;

use serde::{Deserialize, Serialize};

/// Squares per row and per column
pub const BOARD_SIZE: usize = 9;

/// Total number of squares
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// The centre square (throne). Only the King may land here.
pub const CASTLE: Square = Square(40);

/// Castle plus its four orthogonal neighbours
pub const THRONE_ADJACENT: [Square; 5] = [Square(31), Square(39), CASTLE, Square(41), Square(49)];

/// A board square in [0, 80]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square(pub u8);

impl Square {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Square at (row, col), or None when off the board
    pub fn from_coords(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self((row * BOARD_SIZE + col) as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn row(self) -> usize {
        self.index() / BOARD_SIZE
    }

    pub fn col(self) -> usize {
        self.index() % BOARD_SIZE
    }

    /// Is this square on the board?
    pub fn is_valid(self) -> bool {
        self.index() < NUM_SQUARES
    }

    /// On the outer ring of the board
    pub fn is_edge(self) -> bool {
        let (row, col) = (self.row(), self.col());
        row == 0 || row == BOARD_SIZE - 1 || col == 0 || col == BOARD_SIZE - 1
    }

    pub fn is_castle(self) -> bool {
        self == CASTLE
    }

    /// Castle or one of its orthogonal neighbours
    pub fn is_throne_adjacent(self) -> bool {
        THRONE_ADJACENT.contains(&self)
    }

    /// Neighbour in `direction`. Never wraps across a row boundary.
    pub fn step(self, direction: Direction) -> Option<Square> {
        let (dr, dc) = direction.delta();
        let row = self.row() as i8 + dr;
        let col = self.col() as i8 + dc;
        if row < 0 || col < 0 {
            return None;
        }
        Square::from_coords(row as usize, col as usize)
    }

    /// Orthogonal neighbours that exist on the board
    pub fn neighbours(self) -> impl Iterator<Item = Square> {
        DIRECTIONS.into_iter().filter_map(move |dir| self.step(dir))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Orthogonal direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// +1 within the row
    East,
    /// -1 within the row
    West,
    /// +1 row
    South,
    /// -1 row
    North,
}

/// Scan order used by move generation
pub const DIRECTIONS: [Direction; 4] = [
    Direction::East,
    Direction::West,
    Direction::South,
    Direction::North,
];

impl Direction {
    /// (row delta, col delta)
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::South => (1, 0),
            Direction::North => (-1, 0),
        }
    }
}

/// All squares in row-major order
pub fn all_squares() -> impl Iterator<Item = Square> {
    (0..NUM_SQUARES as u8).map(Square)
}

/// The 32 perimeter squares in row-major order
pub fn edge_squares() -> impl Iterator<Item = Square> {
    all_squares().filter(|sq| sq.is_edge())
}
