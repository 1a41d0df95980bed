//! The UCI conversation that turns one position into one best move.
//!
//! ```text
//! -> uci
//! <- ... uciok
//! -> setoption name Ponder value false
//! -> isready
//! <- readyok
//! -> position fen <FEN>
//! -> go movetime <ms>
//! <- ... bestmove e2e4 [ponder e7e5]
//! ```
//!
//! Every inbound line drives an explicit state machine keyed on
//! (current state, message kind). Duplicate or out-of-order handshake tokens
//! and search chatter are ignored rather than advancing the machine, and
//! each pending step carries its own deadline.

use std::time::Duration;

use chess_rules::UciMove;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::channel::EngineChannel;
use crate::error::EngineError;

/// Protocol step the session is currently waiting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionState {
    AwaitingIdentification,
    AwaitingReadiness,
    Searching,
}

impl SessionState {
    fn step_name(self) -> &'static str {
        match self {
            SessionState::AwaitingIdentification => "awaiting identification",
            SessionState::AwaitingReadiness => "awaiting readiness",
            SessionState::Searching => "searching",
        }
    }
}

/// What one inbound line means to the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reply<'a> {
    IdentificationComplete,
    Ready,
    BestMove(Option<&'a str>),
    Chatter,
}

fn classify(line: &str) -> Reply<'_> {
    if line == "uciok" {
        return Reply::IdentificationComplete;
    }
    if line == "readyok" {
        return Reply::Ready;
    }
    if let Some(rest) = line.strip_prefix("bestmove") {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Reply::BestMove(rest.split_whitespace().next());
        }
    }
    Reply::Chatter
}

/// Time budgets for the protocol steps. The search budget is the movetime
/// plus `search_grace`, so a healthy engine always has slack to answer.
#[derive(Clone, Copy, Debug)]
pub struct SessionTimeouts {
    /// Budget for each handshake step (identification, readiness).
    pub handshake: Duration,
    /// Slack on top of the movetime while waiting for the best move.
    pub search_grace: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            handshake: Duration::from_secs(5),
            search_grace: Duration::from_secs(5),
        }
    }
}

/// One engine conversation: handshake, a single timed search, one outcome.
///
/// The session owns its channel exclusively. [`UciSession::best_move`]
/// consumes the session, which makes the protocol invariants structural:
/// the outcome is produced exactly once, a second search cannot be issued
/// through a finished conversation, and the channel is closed on every exit
/// path.
pub struct UciSession {
    channel: Box<dyn EngineChannel>,
    think_time: Duration,
    timeouts: SessionTimeouts,
}

impl UciSession {
    /// `think_time` is fixed for the life of the session; it is read from
    /// the side's settings once per move, never mid-search.
    pub fn new(channel: Box<dyn EngineChannel>, think_time: Duration) -> Self {
        Self {
            channel,
            think_time,
            timeouts: SessionTimeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: SessionTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Drive the engine through the handshake and one search of `fen`.
    pub async fn best_move(mut self, fen: &str) -> Result<UciMove, EngineError> {
        let outcome = self.drive(fen).await;
        self.channel.close().await;
        match &outcome {
            Ok(mv) => debug!(%mv, "session resolved"),
            Err(e) => warn!("session failed: {e}"),
        }
        outcome
    }

    async fn drive(&mut self, fen: &str) -> Result<UciMove, EngineError> {
        let mut state = SessionState::AwaitingIdentification;
        self.channel.send("uci").await;
        let mut deadline = Instant::now() + self.timeouts.handshake;

        loop {
            let line = timeout_at(deadline, self.channel.recv())
                .await
                .map_err(|_| EngineError::ProtocolTimeout {
                    step: state.step_name(),
                    budget: self.budget(state),
                })?
                .ok_or_else(|| {
                    EngineError::TransportUnavailable("engine hung up mid-conversation".into())
                })?;
            debug!(%line, "<- engine");

            match (state, classify(&line)) {
                (SessionState::AwaitingIdentification, Reply::IdentificationComplete) => {
                    // The engine must never search on its own initiative;
                    // pondering would put a second search in flight.
                    self.channel.send("setoption name Ponder value false").await;
                    self.channel.send("isready").await;
                    state = SessionState::AwaitingReadiness;
                    deadline = Instant::now() + self.timeouts.handshake;
                    debug!("identification complete, probing readiness");
                }
                (SessionState::AwaitingReadiness, Reply::Ready) => {
                    self.channel.send(&format!("position fen {fen}")).await;
                    self.channel
                        .send(&format!("go movetime {}", self.think_time.as_millis()))
                        .await;
                    state = SessionState::Searching;
                    deadline = Instant::now() + self.budget(state);
                    debug!(movetime_ms = self.think_time.as_millis() as u64, "search started");
                }
                (SessionState::Searching, Reply::BestMove(token)) => {
                    let token = token.ok_or_else(|| EngineError::MalformedReply(line.clone()))?;
                    let mv = token
                        .parse::<UciMove>()
                        .map_err(|_| EngineError::MalformedReply(token.to_owned()))?;
                    return Ok(mv);
                }
                // Readiness before identification, duplicate tokens, stray
                // best moves and search chatter all land here. They carry no
                // protocol meaning in the current state, and ignoring them
                // does not extend the step's deadline.
                (current, reply) => {
                    debug!(state = ?current, ?reply, "line ignored");
                }
            }
        }
    }

    fn budget(&self, state: SessionState) -> Duration {
        match state {
            SessionState::Searching => self.think_time + self.timeouts.search_grace,
            _ => self.timeouts.handshake,
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
