//! Draw detection through the rules facade:
//! - Stalemate
//! - Fifty-move rule
//! - Threefold repetition
//! - Insufficient material

use chess_rules::{Game, UciMove};

fn apply(game: &mut Game, text: &str) {
    let mv: UciMove = text.parse().unwrap();
    game.apply_move(mv).unwrap();
}

// =============================================================================
// Stalemate
// =============================================================================

#[test]
fn stalemated_king_in_the_corner_is_a_draw() {
    // Black king on a8, white king on c7, white queen on b6.
    let game = Game::from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(game.legal_moves().is_empty());
    assert!(!game.is_in_check());
    assert!(game.is_draw());
}

#[test]
fn king_and_pawn_stalemate_is_a_draw() {
    // White king g6, white pawn g7, black king g8.
    let game = Game::from_fen("6k1/6P1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(game.legal_moves().is_empty());
    assert!(game.is_draw());
    assert!(!game.is_checkmate());
}

// =============================================================================
// Fifty-move rule
// =============================================================================

#[test]
fn hundred_halfmoves_without_progress_is_a_draw() {
    let game = Game::from_fen("8/8/8/4k3/8/4K3/6R1/8 w - - 100 60").unwrap();
    assert!(game.is_draw());
}

#[test]
fn ninety_nine_halfmoves_is_not_yet_a_draw() {
    let game = Game::from_fen("8/8/8/4k3/8/4K3/6R1/8 w - - 99 60").unwrap();
    assert!(!game.is_draw());
}

// =============================================================================
// Threefold repetition
// =============================================================================

#[test]
fn knight_shuffle_reaches_threefold_repetition() {
    let mut game = Game::new();

    // Two full shuffles return to the starting position twice, so the
    // position has now occurred three times in total.
    for _ in 0..2 {
        for text in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            assert!(!game.is_draw(), "draw flagged before the shuffle finished");
            apply(&mut game, text);
        }
    }

    assert!(game.is_draw());
    assert!(game.is_game_over());
}

#[test]
fn two_occurrences_are_not_a_repetition_draw() {
    let mut game = Game::new();
    for text in ["g1f3", "g8f6", "f3g1", "f6g8"] {
        apply(&mut game, text);
    }
    assert!(!game.is_draw());
}

// =============================================================================
// Insufficient material
// =============================================================================

#[test]
fn bare_kings_cannot_mate() {
    let game = Game::from_fen("8/8/8/4k3/8/4K3/8/8 w - - 0 1").unwrap();
    assert!(game.is_draw());
}

#[test]
fn lone_minor_piece_cannot_mate() {
    let bishop = Game::from_fen("8/8/8/4k3/8/4KB2/8/8 w - - 0 1").unwrap();
    assert!(bishop.is_draw());

    let knight = Game::from_fen("8/8/8/4k3/8/4KN2/8/8 w - - 0 1").unwrap();
    assert!(knight.is_draw());

    let black_bishop = Game::from_fen("8/8/4b3/4k3/8/4K3/8/8 w - - 0 1").unwrap();
    assert!(black_bishop.is_draw());

    let black_knight = Game::from_fen("8/8/4n3/4k3/8/4K3/8/8 w - - 0 1").unwrap();
    assert!(black_knight.is_draw());
}

#[test]
fn same_colored_bishops_cannot_mate() {
    // Both bishops on dark squares (c1 and f8).
    let game = Game::from_fen("5b2/8/8/4k3/8/4K3/8/2B5 w - - 0 1").unwrap();
    assert!(game.is_draw());
}

#[test]
fn opposite_colored_bishops_can_still_mate() {
    // White bishop on c1 (dark), black bishop on c8 (light).
    let game = Game::from_fen("2b5/8/8/4k3/8/4K3/8/2B5 w - - 0 1").unwrap();
    assert!(!game.is_draw());
}

#[test]
fn pawns_rooks_and_queens_keep_the_game_alive() {
    let pawn = Game::from_fen("8/8/8/4k3/8/4K3/4P3/8 w - - 0 1").unwrap();
    assert!(!pawn.is_draw());

    let rook = Game::from_fen("8/8/8/4k3/8/4K3/8/4R3 w - - 0 1").unwrap();
    assert!(!rook.is_draw());

    let queen = Game::from_fen("8/8/8/4k3/8/4K3/8/4Q3 w - - 0 1").unwrap();
    assert!(!queen.is_draw());
}
