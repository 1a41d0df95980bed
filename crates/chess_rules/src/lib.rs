//! Chess rules facade for the play workspace.
//!
//! Legality, FEN handling and game-end detection are delegated to
//! `cozy-chess`; this crate wraps it behind the small interface the rest of
//! the workspace consumes:
//! - the coordinate move codec ("e2e4", "a7a8q") shared by the protocol
//!   client and the game controller
//! - a [`Game`] adapter exposing turn, legal moves, move application and
//!   the end-of-game conditions the UI reports

pub mod game;
pub mod uci;

pub use game::{Game, IllegalMove, InvalidFen, Side};
pub use uci::{coord_to_sq, sq_to_coord, MoveParseError, Promotion, UciMove};
