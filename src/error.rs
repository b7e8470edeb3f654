//! Error types for the IRC client.
//!
//! [`ClientError`] is the single error type surfaced by the client handle and
//! carried inside [`DomainEvent::Error`](crate::event::DomainEvent::Error).
//! [`MessageParseError`] describes why an inbound line could not be parsed.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Top-level client errors.
///
/// Cloneable so the same error can be returned to a caller and published
/// as an event; I/O errors are shared behind an [`Arc`].
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ClientError {
    /// A caller-supplied argument was rejected before any I/O took place.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A connection attempt is already in flight (or a reconnect is pending).
    #[error("already connecting")]
    AlreadyConnecting,

    /// The client is already connected.
    #[error("already connected")]
    AlreadyConnected,

    /// The TCP connection was not established in time.
    #[error("connection timed out after {0:?}")]
    ConnectionTimeout(Duration),

    /// The underlying transport failed.
    #[error("socket error: {0}")]
    Socket(#[source] Arc<std::io::Error>),

    /// A command was sent while the client was not connected.
    #[error("not connected")]
    NotConnected,

    /// An inbound line could not be parsed.
    #[error("malformed message: {line:?}")]
    MalformedMessage {
        /// The offending line, without its terminator.
        line: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },

    /// The server did not answer a keepalive PING in time.
    #[error("ping timeout after {0:?}")]
    PingTimeout(Duration),

    /// The connection task has stopped; the handle can no longer be used.
    #[error("client task has shut down")]
    Shutdown,
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Socket(Arc::new(err))
    }
}

impl ClientError {
    /// Whether this error ends the current connection.
    #[must_use]
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::Socket(_) | Self::ConnectionTimeout(_) | Self::PingTimeout(_)
        )
    }
}

/// Errors encountered when parsing IRC messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// The prefix was not followed by a space (or was empty).
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),

    /// Command was missing or not a word/numeric.
    #[error("invalid command")]
    InvalidCommand,

    /// Parsing error with position information.
    #[error("parsing failed at position {position}: {context}")]
    ParseContext {
        /// Byte position where parsing failed.
        position: usize,
        /// Description of what was being parsed.
        context: String,
    },
}
