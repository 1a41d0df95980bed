//! Client side of the UCI protocol: everything needed to ask one engine for
//! one move.
//!
//! - [`EngineChannel`] hides the transport (spawned engine process or TCP
//!   endpoint) behind a line-oriented duplex channel.
//! - [`UciSession`] owns a channel for exactly one conversation: handshake,
//!   timed search, best-move reply. It is a small explicit state machine
//!   with a timeout on every step.
//! - [`EngineError`] is the complete failure taxonomy an engine-backed
//!   opponent can surface.

pub mod channel;
pub mod error;
pub mod session;

pub use channel::{EngineChannel, EngineEndpoint, SocketChannel, WorkerChannel};
pub use error::EngineError;
pub use session::{SessionTimeouts, UciSession};
