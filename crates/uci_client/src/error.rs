//! Failure taxonomy for engine-backed opponents.

use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong between "ask the engine" and "have a move".
///
/// All variants are terminal for the session that produced them; the game
/// layer reports them as "this opponent could not move" and never applies a
/// partial move.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The transport could not be opened, or it went away mid-conversation.
    #[error("engine transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The reply a protocol step was waiting for never arrived within the
    /// step's time budget.
    #[error("engine gave no reply while {step} within {budget:?}")]
    ProtocolTimeout {
        step: &'static str,
        budget: Duration,
    },

    /// A best-move line arrived but its move token does not decode.
    #[error("malformed best-move reply {0:?}")]
    MalformedReply(String),

    /// The engine chose a move the rules reject. Detected by the game layer
    /// after decoding; never applied.
    #[error("engine played illegal move {0}")]
    IllegalEngineMove(String),
}
