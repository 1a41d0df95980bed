//! Turn orchestration. The controller owns the game, asks the right
//! opponent for machine moves, gates what humans may drag, and tells
//! observers what happened after every ply.

use std::time::Duration;

use tracing::{info, warn};

use chess_rules::{Game, IllegalMove, InvalidFen, Promotion, Side, UciMove};
use uci_client::EngineError;

use crate::opponents::OpponentSelector;
use crate::settings::{Controller, PlaySettings};

/// Pause before a machine reply to a machine move, so a board view gets a
/// moment to finish animating the previous ply.
pub const MACHINE_REPLY_DELAY: Duration = Duration::from_millis(1000);

/// What observers learn when a ply lands on the board.
#[derive(Clone, Debug)]
pub struct MoveApplied {
    pub mv: UciMove,
    pub by: Side,
    /// Position after the move.
    pub fen: String,
    pub in_check: bool,
    pub checkmate: bool,
    pub draw: bool,
    /// The next side is machine-controlled; the caller should drive
    /// [`GameController::advance`] once it has caught up.
    pub schedule_opponent: bool,
    /// The move came from a machine. Callers that animate should wait
    /// [`MACHINE_REPLY_DELAY`] before advancing again.
    pub from_machine: bool,
}

/// Passive view of game progress.
pub trait GameObserver: Send {
    fn move_applied(&mut self, update: &MoveApplied);

    fn opponent_failed(&mut self, side: Side, error: &EngineError) {
        let _ = (side, error);
    }
}

/// Outcome of a human drop attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    Applied,
    /// The piece goes back where it was picked up.
    Snapback,
}

pub struct GameController {
    game: Game,
    selector: OpponentSelector,
    observers: Vec<Box<dyn GameObserver>>,
    /// Side whose opponent failed. Machine play stays paused for that side
    /// until [`GameController::set_controller`] picks a replacement.
    failed: Option<Side>,
}

impl GameController {
    pub fn new(settings: PlaySettings) -> Self {
        Self::with_selector(OpponentSelector::new(settings))
    }

    pub fn with_selector(selector: OpponentSelector) -> Self {
        Self {
            game: Game::new(),
            selector,
            observers: Vec::new(),
            failed: None,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn settings(&self) -> &PlaySettings {
        &self.selector.settings
    }

    /// Reset to the starting position. Controllers and think times carry
    /// over; a latched failure does not.
    pub fn new_game(&mut self) {
        self.game = Game::new();
        self.failed = None;
        info!("new game started");
    }

    /// Replace the game with one starting from `fen`.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), InvalidFen> {
        self.game = Game::from_fen(fen)?;
        self.failed = None;
        Ok(())
    }

    /// Change who plays `side` from the next ply on. Picking a new
    /// controller is also how play resumes after that side's opponent
    /// failed.
    pub fn set_controller(&mut self, side: Side, controller: Controller) {
        self.selector.settings.side_mut(side).controller = controller;
        if self.failed == Some(side) {
            self.failed = None;
        }
        info!(side = side.name(), %controller, "controller changed");
    }

    /// Think time is read once per move; a search already in flight keeps
    /// the budget it started with.
    pub fn set_think_time(&mut self, side: Side, secs: u64) {
        self.selector.settings.side_mut(side).think_time_secs = secs.max(1);
    }

    /// Drag gate: only the human side to move may pick up its own pieces,
    /// and only while the game is on.
    pub fn can_pick_up(&self, square: u8) -> bool {
        if self.game.is_game_over() {
            return false;
        }
        let side = self.game.turn();
        if self.selector.settings.side(side).controller != Controller::Human {
            return false;
        }
        self.game.side_at(square) == Some(side)
    }

    /// Drop attempt from a human. Anything the rules reject snaps back.
    pub fn try_drop(&mut self, from: u8, to: u8) -> DropOutcome {
        self.try_move(UciMove::new(from, to))
    }

    /// Same gate as [`GameController::try_drop`], for callers that already
    /// hold a wire move. An explicit promotion piece is honored; a bare
    /// move onto the back rank still defaults to a queen.
    pub fn try_move(&mut self, mv: UciMove) -> DropOutcome {
        if !self.can_pick_up(mv.from) {
            return DropOutcome::Snapback;
        }
        match self.apply_with_queen_default(mv) {
            Ok(mv) => {
                self.after_move(mv, false);
                DropOutcome::Applied
            }
            Err(_) => DropOutcome::Snapback,
        }
    }

    /// True when the side to move is machine-controlled, its opponent has
    /// not failed, and the game is still on.
    pub fn machine_turn(&self) -> bool {
        !self.game.is_game_over()
            && self.failed != Some(self.game.turn())
            && self.selector.settings.side(self.game.turn()).controller != Controller::Human
    }

    /// Ask the machine opponent of the side to move for its move and apply
    /// it. Returns true when a ply landed on the board. Failures latch the
    /// side and are reported through [`GameObserver::opponent_failed`].
    pub async fn advance(&mut self) -> bool {
        if !self.machine_turn() {
            return false;
        }
        let side = self.game.turn();
        let Some(mut opponent) = self.selector.for_side(side) else {
            return false;
        };

        info!(side = side.name(), "machine move requested");
        match opponent.choose_move(&self.game).await {
            Ok(mv) => match self.apply_with_queen_default(mv) {
                Ok(mv) => {
                    self.after_move(mv, true);
                    true
                }
                Err(_) => {
                    self.fail_side(side, EngineError::IllegalEngineMove(mv.to_string()));
                    false
                }
            },
            Err(error) => {
                self.fail_side(side, error);
                false
            }
        }
    }

    /// One line of status text for the position.
    pub fn status_line(&self) -> String {
        let side = self.game.turn();
        if self.game.is_checkmate() {
            return format!("Game over, {} is in checkmate.", side.name());
        }
        if self.game.is_draw() {
            return "Game over, drawn position".to_string();
        }
        if let Some(failed) = self.failed {
            return format!("{} could not move, choose another opponent", failed.name());
        }
        if self.machine_turn() {
            return format!("{} is thinking", side.name());
        }
        let mut status = format!("{} to move", side.name());
        if self.game.is_in_check() {
            status.push_str(&format!(", {} is in check", side.name()));
        }
        status
    }

    /// Apply `mv`, retrying with a queen when a bare move was rejected only
    /// because it needed a promotion piece.
    fn apply_with_queen_default(&mut self, mv: UciMove) -> Result<UciMove, IllegalMove> {
        match self.game.apply_move(mv) {
            Ok(applied) => Ok(applied),
            Err(rejected) if mv.promotion.is_none() => {
                let queened = UciMove::with_promotion(mv.from, mv.to, Promotion::Queen);
                self.game.apply_move(queened).or(Err(rejected))
            }
            Err(rejected) => Err(rejected),
        }
    }

    fn after_move(&mut self, mv: UciMove, from_machine: bool) {
        let by = self.game.turn().other();
        let update = MoveApplied {
            mv,
            by,
            fen: self.game.fen(),
            in_check: self.game.is_in_check(),
            checkmate: self.game.is_checkmate(),
            draw: self.game.is_draw(),
            schedule_opponent: self.machine_turn(),
            from_machine,
        };
        info!(mv = %mv, by = by.name(), "move applied");
        for observer in &mut self.observers {
            observer.move_applied(&update);
        }
    }

    fn fail_side(&mut self, side: Side, error: EngineError) {
        warn!(side = side.name(), "opponent could not move: {}", error);
        self.failed = Some(side);
        for observer in &mut self.observers {
            observer.opponent_failed(side, &error);
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
