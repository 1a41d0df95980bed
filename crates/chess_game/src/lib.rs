//! Plays a game of chess between any mix of human, engine and random
//! opponents.
//!
//! The [`GameController`] owns the game and drives it ply by ply: humans
//! move through the drag gate ([`GameController::can_pick_up`] and
//! [`GameController::try_drop`]), machines through
//! [`GameController::advance`], which asks the [`OpponentSelector`] for the
//! right move source. Progress is pushed to [`GameObserver`]s.

pub mod controller;
pub mod opponents;
pub mod settings;

pub use controller::{
    DropOutcome, GameController, GameObserver, MoveApplied, MACHINE_REPLY_DELAY,
};
pub use opponents::{EngineOpponent, Opponent, OpponentSelector, RandomOpponent};
pub use settings::{Controller, EngineSettings, PlaySettings, SideSettings};
pub use uci_client::EngineError;
