//! Rules tests for Tablut Core
//!
//! Captures, King capture near the throne, and terminal detection, each on a
//! hand-built position.

use tablut_core::{
    board::{Square, CASTLE},
    game::{GameState, Move},
    pieces::{GameResult, Piece, Player},
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn position(rows: [&str; 9], turn: Player) -> GameState {
    GameState::from_diagram(&rows, turn).expect("valid diagram")
}

fn mv(from: u8, to: u8) -> Move {
    Move::new(Square(from), Square(to))
}

/// Apply a move that must be legal
fn play(game: &mut GameState, from: u8, to: u8) {
    game.try_apply_move(mv(from, to)).expect("legal move");
}

/// White pieces and King boxed in the centre by a Black ring
const RING: [&str; 9] = [
    ".........",
    ".........",
    "...BBB...",
    "..B...B..",
    "..BWK.B..",
    "..B...B..",
    "...BBB...",
    ".........",
    ".........",
];

// ============================================================================
// MOVE GENERATION
// ============================================================================

#[test]
fn test_no_piece_but_king_lands_on_castle() {
    let mut game = GameState::starting_position();
    // Walk a fixed line of play and check every position on the way
    for ply in 0..40 {
        if game.result().is_over() || game.generate_moves().is_empty() {
            break;
        }
        for m in game.generate_moves() {
            if m.to == CASTLE {
                assert_eq!(game.piece_at(m.from), Piece::King);
            }
        }
        let moves = game.generate_moves();
        let next = moves[(ply * 7) % moves.len()];
        game.apply_move(next);
    }
}

#[test]
fn test_starting_black_moves() {
    let mut game = GameState::starting_position();
    play(&mut game, 22, 23);
    assert_eq!(game.generate_moves().len(), 79);

    let start = position(tablut_core::STARTING_DIAGRAM, Player::Black);
    assert_eq!(start.generate_moves().len(), 80);
}

// ============================================================================
// CAPTURES
// ============================================================================

#[test]
fn test_white_captures_flanked_black() {
    let mut game = position(
        [
            ".........",
            ".........",
            ".WB......",
            ".........",
            "....K....",
            ".........",
            "...W.....",
            ".........",
            ".........",
        ],
        Player::White,
    );
    play(&mut game, 57, 21);
    assert_eq!(game.piece_at(Square(20)), Piece::Empty);
    assert_eq!(game.piece_at(Square(21)), Piece::White);
    assert_eq!(game.count(Piece::White), 2);
}

#[test]
fn test_black_captures_flanked_white() {
    let mut game = position(
        [
            ".........",
            ".........",
            ".BW......",
            ".........",
            "....K....",
            ".........",
            "...B.....",
            ".........",
            ".........",
        ],
        Player::Black,
    );
    play(&mut game, 57, 21);
    assert_eq!(game.piece_at(Square(20)), Piece::Empty);
    assert_eq!(game.count(Piece::Black), 2);
}

#[test]
fn test_king_acts_as_white_anvil() {
    let mut game = position(
        [
            ".........",
            ".........",
            ".KB......",
            ".........",
            ".........",
            ".........",
            "...W.....",
            ".........",
            ".........",
        ],
        Player::White,
    );
    play(&mut game, 57, 21);
    assert_eq!(game.piece_at(Square(20)), Piece::Empty);
}

#[test]
fn test_capture_does_not_wrap_rows() {
    // 26 is the end of row 2; 27 and 28 start row 3
    let mut game = position(
        [
            ".........",
            ".........",
            ".........",
            "BW.......",
            "....K....",
            ".........",
            "........W",
            ".........",
            ".........",
        ],
        Player::White,
    );
    play(&mut game, 62, 26);
    assert_eq!(game.piece_at(Square(27)), Piece::Black);
}

#[test]
fn test_moving_between_enemies_is_safe() {
    let mut game = position(
        [
            ".........",
            ".........",
            ".B.B.....",
            ".........",
            "....K....",
            ".........",
            "..W......",
            ".........",
            ".........",
        ],
        Player::White,
    );
    play(&mut game, 56, 20);
    assert_eq!(game.piece_at(Square(20)), Piece::White);
    assert_eq!(game.count(Piece::Black), 2);
}

// ============================================================================
// KING CAPTURE
// ============================================================================

#[test]
fn test_king_flanked_away_from_throne() {
    let mut game = position(
        [
            ".........",
            ".........",
            "...BK....",
            ".........",
            ".........",
            ".........",
            ".....B...",
            ".........",
            ".........",
        ],
        Player::Black,
    );
    play(&mut game, 59, 23);
    assert_eq!(game.king_square(), None);
    assert_eq!(game.result(), GameResult::BlackWins);
    assert_eq!(game.is_terminal(), (true, Some(Player::Black)));
}

#[test]
fn test_king_beside_throne_needs_four_sides() {
    // Three attackers and the empty castle is not enough when one side is open
    let mut open = position(
        [
            ".........",
            ".........",
            "....B....",
            "....K..B.",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
        ],
        Player::Black,
    );
    play(&mut open, 34, 32);
    assert_eq!(open.piece_at(Square(31)), Piece::King);

    let mut guarded = position(
        [
            ".........",
            ".........",
            "....B....",
            "...WK..B.",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
        ],
        Player::Black,
    );
    play(&mut guarded, 34, 32);
    assert_eq!(guarded.piece_at(Square(31)), Piece::King);

    let mut closed = position(
        [
            ".........",
            ".........",
            "....B....",
            "...BK..B.",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
        ],
        Player::Black,
    );
    play(&mut closed, 34, 32);
    assert_eq!(closed.piece_at(Square(31)), Piece::Empty);
    assert_eq!(closed.result(), GameResult::BlackWins);
}

#[test]
fn test_king_on_castle() {
    let mut surrounded = position(
        [
            ".........",
            ".........",
            ".........",
            "....B....",
            "...BKB...",
            ".........",
            ".........",
            "....B....",
            ".........",
        ],
        Player::Black,
    );
    play(&mut surrounded, 67, 49);
    assert_eq!(surrounded.piece_at(CASTLE), Piece::Empty);

    let mut defended = position(
        [
            ".........",
            ".........",
            ".........",
            "....B....",
            "...BKW...",
            ".........",
            ".........",
            "....B....",
            ".........",
        ],
        Player::Black,
    );
    play(&mut defended, 67, 49);
    assert_eq!(defended.piece_at(CASTLE), Piece::King);
}

// ============================================================================
// TERMINAL DETECTION
// ============================================================================

#[test]
fn test_king_escape() {
    let mut game = position(
        [
            ".........",
            "....K....",
            ".........",
            ".........",
            ".........",
            ".........",
            "B.......B",
            ".........",
            ".........",
        ],
        Player::White,
    );
    assert_eq!(game.result(), GameResult::Ongoing);
    play(&mut game, 13, 4);
    assert_eq!(game.turn(), Player::Black);
    assert_eq!(game.is_terminal(), (true, Some(Player::White)));
}

#[test]
fn test_encirclement() {
    let ringed = position(RING, Player::White);
    assert!(ringed.white_encircled());
    assert_eq!(ringed.result(), GameResult::BlackWins);

    // Only checked with White to move
    let black_to_move = position(RING, Player::Black);
    assert_eq!(black_to_move.result(), GameResult::Ongoing);

    let mut gap = RING;
    gap[2] = "...B.B...";
    let open = position(gap, Player::White);
    assert!(!open.white_encircled());
    assert_eq!(open.is_terminal(), (false, None));
}

#[test]
fn test_piece_on_edge_breaks_encirclement() {
    let mut rows = RING;
    rows[8] = "W........";
    assert!(!position(rows, Player::White).white_encircled());
}

#[test]
fn test_repetition_draw() {
    let mut game = position(
        [
            ".........",
            ".........",
            "..W......",
            ".........",
            "....K....",
            ".........",
            "......B..",
            ".........",
            ".........",
        ],
        Player::White,
    );

    let cycle = [(20, 21), (60, 61), (21, 20), (61, 60), (20, 21)];
    for (from, to) in cycle {
        play(&mut game, from, to);
        assert_eq!(game.result(), GameResult::Ongoing);
    }

    play(&mut game, 60, 61);
    assert_eq!(game.result(), GameResult::Draw);
    assert_eq!(game.is_terminal(), (true, None));
}

#[test]
fn test_starting_position_not_terminal() {
    let game = GameState::starting_position();
    assert!(!game.white_encircled());
    assert_eq!(game.is_terminal(), (false, None));
}
