//! Machine move sources and the per-side dispatch between them.

use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::thread_rng;
use tracing::debug;

use chess_rules::{Game, Side, UciMove};
use uci_client::{EngineError, SessionTimeouts, UciSession};

use crate::settings::{Controller, PlaySettings};

/// Anything that can produce a move for the side to play.
///
/// Human sides have no [`Opponent`]; their moves come in through
/// [`crate::GameController::try_drop`].
#[async_trait]
pub trait Opponent: Send {
    async fn choose_move(&mut self, game: &Game) -> Result<UciMove, EngineError>;
}

/// Uniform choice among the legal moves.
pub struct RandomOpponent;

#[async_trait]
impl Opponent for RandomOpponent {
    async fn choose_move(&mut self, game: &Game) -> Result<UciMove, EngineError> {
        let moves = game.legal_moves();
        match moves.choose(&mut thread_rng()) {
            Some(mv) => Ok(*mv),
            // Same shape an engine gives for a dead position ("bestmove (none)").
            None => Err(EngineError::MalformedReply("(none)".to_string())),
        }
    }
}

/// UCI engine reached through a fresh session per move.
pub struct EngineOpponent {
    endpoint: uci_client::EngineEndpoint,
    think_time: Duration,
    timeouts: SessionTimeouts,
}

impl EngineOpponent {
    pub fn new(endpoint: uci_client::EngineEndpoint, think_time: Duration) -> Self {
        Self {
            endpoint,
            think_time,
            timeouts: SessionTimeouts::default(),
        }
    }
}

#[async_trait]
impl Opponent for EngineOpponent {
    async fn choose_move(&mut self, game: &Game) -> Result<UciMove, EngineError> {
        let channel = self.endpoint.open().await?;
        let session = UciSession::new(channel, self.think_time).with_timeouts(self.timeouts);
        session.best_move(&game.fen()).await
    }
}

/// Decides, per side, which move source to hand back.
pub struct OpponentSelector {
    pub settings: PlaySettings,
    session_timeouts: SessionTimeouts,
}

impl OpponentSelector {
    pub fn new(settings: PlaySettings) -> Self {
        Self {
            settings,
            session_timeouts: SessionTimeouts::default(),
        }
    }

    /// Protocol budgets for engine sessions. Play code never touches this;
    /// tests shrink the budgets so failure paths finish quickly.
    pub fn with_session_timeouts(mut self, timeouts: SessionTimeouts) -> Self {
        self.session_timeouts = timeouts;
        self
    }

    /// `None` means the side is played by a human.
    pub fn for_side(&self, side: Side) -> Option<Box<dyn Opponent>> {
        let side_settings = self.settings.side(side);
        match side_settings.controller {
            Controller::Human => None,
            Controller::Random => {
                debug!(side = side.name(), "selected the random opponent");
                Some(Box::new(RandomOpponent))
            }
            Controller::Engine => {
                debug!(
                    side = side.name(),
                    think_secs = side_settings.think_time_secs,
                    "selected the engine opponent"
                );
                let mut opponent =
                    EngineOpponent::new(self.settings.engine.endpoint(), side_settings.think_time());
                opponent.timeouts = self.session_timeouts;
                Some(Box::new(opponent))
            }
        }
    }
}

#[cfg(test)]
#[path = "opponents_tests.rs"]
mod opponents_tests;
