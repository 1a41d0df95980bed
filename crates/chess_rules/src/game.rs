//! Game state adapter over `cozy_chess::Board`.
//!
//! The board library owns legality and FEN; this adapter adds what it leaves
//! to the caller (threefold repetition over a hash history, the fifty-move
//! rule, insufficient material) and translates between wire moves and the
//! library's internal move encoding.

use cozy_chess::{Board, Color, File, Move as BoardMove, Piece, Rank, Square};
use thiserror::Error;

use crate::uci::{Promotion, UciMove};

/// One of the two players.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Capitalized name for status text.
    pub fn name(self) -> &'static str {
        match self {
            Side::White => "White",
            Side::Black => "Black",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("illegal move {0}")]
pub struct IllegalMove(pub UciMove);

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid FEN: {0}")]
pub struct InvalidFen(pub String);

/// Full game state: the current position plus the hash history needed for
/// repetition detection.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    seen_hashes: Vec<u64>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Start a game from the standard starting position.
    pub fn new() -> Self {
        let board = Board::default();
        let seen_hashes = vec![board.hash()];
        Self { board, seen_hashes }
    }

    /// Start a game from an arbitrary FEN position.
    pub fn from_fen(fen: &str) -> Result<Self, InvalidFen> {
        let board =
            Board::from_fen(fen, false).map_err(|e| InvalidFen(format!("{fen:?}: {e:?}")))?;
        let seen_hashes = vec![board.hash()];
        Ok(Self { board, seen_hashes })
    }

    /// The side to move.
    pub fn turn(&self) -> Side {
        side_from(self.board.side_to_move())
    }

    /// The current position as a FEN string.
    pub fn fen(&self) -> String {
        format!("{}", self.board)
    }

    /// The side owning the piece on `sq`, if any.
    pub fn side_at(&self, sq: u8) -> Option<Side> {
        board_square(sq).and_then(|s| self.board.color_on(s)).map(side_from)
    }

    pub fn is_in_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    pub fn is_checkmate(&self) -> bool {
        !self.has_any_move() && self.is_in_check()
    }

    /// Stalemate, fifty-move rule, threefold repetition or insufficient
    /// material.
    pub fn is_draw(&self) -> bool {
        self.is_stalemate()
            || self.is_fifty_move_draw()
            || self.is_threefold_repetition()
            || self.is_insufficient_material()
    }

    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// Every legal move in the current position, in wire form.
    pub fn legal_moves(&self) -> Vec<UciMove> {
        let mut out = Vec::new();
        self.board.generate_moves(|batch| {
            for mv in batch {
                out.push(self.encode_move(mv));
            }
            false
        });
        out
    }

    /// Apply a wire move if it is legal. The position and hash history are
    /// untouched when the move is rejected.
    pub fn apply_move(&mut self, mv: UciMove) -> Result<UciMove, IllegalMove> {
        let decoded = self.decode_move(mv).ok_or(IllegalMove(mv))?;
        if self.board.try_play(decoded).is_err() {
            return Err(IllegalMove(mv));
        }
        self.seen_hashes.push(self.board.hash());
        Ok(mv)
    }

    fn has_any_move(&self) -> bool {
        // The generator stops as soon as the listener says so; a stopped
        // generator means at least one move existed.
        self.board.generate_moves(|_| true)
    }

    fn is_stalemate(&self) -> bool {
        !self.has_any_move() && !self.is_in_check()
    }

    fn is_fifty_move_draw(&self) -> bool {
        self.board.halfmove_clock() >= 100
    }

    fn is_threefold_repetition(&self) -> bool {
        let current = self.board.hash();
        self.seen_hashes.iter().filter(|&&h| h == current).count() >= 3
    }

    fn is_insufficient_material(&self) -> bool {
        let heavy = self.board.pieces(Piece::Pawn)
            | self.board.pieces(Piece::Rook)
            | self.board.pieces(Piece::Queen);
        if !heavy.is_empty() {
            return false;
        }
        let knights = self.board.pieces(Piece::Knight);
        let bishops = self.board.pieces(Piece::Bishop);
        if knights.len() + bishops.len() <= 1 {
            // Bare kings or a lone minor piece.
            return true;
        }
        knights.is_empty() && single_colored(bishops)
    }

    /// Wire form of a legal move produced by the board library. Castling is
    /// generated as king-takes-own-rook and goes out as the standard
    /// two-file king move.
    fn encode_move(&self, mv: BoardMove) -> UciMove {
        let own = self.board.side_to_move();
        let to = if self.board.piece_on(mv.from) == Some(Piece::King)
            && self.board.color_on(mv.to) == Some(own)
        {
            let file = if mv.to.file() > mv.from.file() {
                File::G
            } else {
                File::C
            };
            Square::new(file, mv.to.rank())
        } else {
            mv.to
        };
        UciMove {
            from: mv.from as u8,
            to: to as u8,
            promotion: mv.promotion.and_then(promotion_from_piece),
        }
    }

    /// Board form of a wire move, or None when no legal reading exists.
    /// The standard castling encoding (king moves two files) is translated
    /// to the library's king-takes-rook encoding.
    fn decode_move(&self, mv: UciMove) -> Option<BoardMove> {
        let from = board_square(mv.from)?;
        let to = board_square(mv.to)?;
        let direct = BoardMove {
            from,
            to,
            promotion: mv.promotion.map(promotion_piece),
        };
        if self.board.is_legal(direct) {
            return Some(direct);
        }
        if self.board.piece_on(from) == Some(Piece::King) && from.rank() == to.rank() {
            let rook_file = match (from.file(), to.file()) {
                (File::E, File::G) => Some(File::H),
                (File::E, File::C) => Some(File::A),
                _ => None,
            };
            if let Some(file) = rook_file {
                let castle = BoardMove {
                    from,
                    to: Square::new(file, to.rank()),
                    promotion: None,
                };
                if self.board.is_legal(castle) {
                    return Some(castle);
                }
            }
        }
        None
    }
}

fn side_from(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

fn board_square(sq: u8) -> Option<Square> {
    let file = File::try_index((sq % 8) as usize)?;
    let rank = Rank::try_index((sq / 8) as usize)?;
    Some(Square::new(file, rank))
}

fn promotion_piece(p: Promotion) -> Piece {
    match p {
        Promotion::Queen => Piece::Queen,
        Promotion::Rook => Piece::Rook,
        Promotion::Bishop => Piece::Bishop,
        Promotion::Knight => Piece::Knight,
    }
}

fn promotion_from_piece(p: Piece) -> Option<Promotion> {
    match p {
        Piece::Queen => Some(Promotion::Queen),
        Piece::Rook => Some(Promotion::Rook),
        Piece::Bishop => Some(Promotion::Bishop),
        Piece::Knight => Some(Promotion::Knight),
        _ => None,
    }
}

fn single_colored(bishops: cozy_chess::BitBoard) -> bool {
    let mut seen_dark = None;
    for sq in bishops {
        let dark = (sq.file() as usize + sq.rank() as usize) % 2 == 0;
        match seen_dark {
            None => seen_dark = Some(dark),
            Some(d) if d != dark => return false,
            Some(_) => {}
        }
    }
    true
}

#[cfg(test)]
#[path = "game_tests.rs"]
mod game_tests;
