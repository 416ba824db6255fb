//! Error types for the bot engine.
//!
//! This module defines error types for transport failures, line parsing
//! failures, mode serialization, and handler failures.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level engine errors.
///
/// `Io`, `InvalidMessage`, and `Handler` failures inside a running
/// connection are caught by the reconnect loop, logged, and converted into
/// a fresh connection cycle. They are never fatal to the process.
/// `EmptyMode` is returned synchronously to the caller of the mode
/// serializer, before anything is written to the wire.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during connecting, reading, or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A received line did not match the message grammar.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The raw line as received.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },

    /// Attempted to serialize a mode change with no targets.
    #[error("mode change has no targets")]
    EmptyMode,

    /// A dispatched handler returned an error.
    #[error("handler for {command} failed: {source}")]
    Handler {
        /// The command the failing handler was registered for.
        command: String,
        /// The handler's error.
        #[source]
        source: anyhow::Error,
    },
}

/// Errors encountered when parsing received lines.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty after stripping the terminator.
    #[error("empty message")]
    EmptyMessage,

    /// Line had a prefix but no command after it.
    #[error("missing command")]
    MissingCommand,

    /// Message prefix was neither a user origin nor a server origin.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),
}
