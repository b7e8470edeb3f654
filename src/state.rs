//! Connection lifecycle state.
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> Disconnected | Error
//! Disconnected | Error -> Reconnecting -> Connecting
//! ```

use std::fmt;

use crate::error::ClientError;

/// Where the client is in its connection lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionState {
    /// No link and nothing scheduled.
    #[default]
    Disconnected,
    /// A TCP connection attempt is in flight.
    Connecting,
    /// Registered with the server; commands may be sent.
    Connected,
    /// Waiting out the backoff before the next automatic attempt.
    Reconnecting,
    /// The last attempt or session failed.
    Error,
}

impl ConnectionState {
    /// Check that a new `connect` request is allowed in this state.
    ///
    /// # Errors
    ///
    /// [`ClientError::AlreadyConnecting`] while connecting or waiting to
    /// reconnect, [`ClientError::AlreadyConnected`] while connected.
    pub fn check_connect(self) -> Result<(), ClientError> {
        match self {
            Self::Connecting | Self::Reconnecting => Err(ClientError::AlreadyConnecting),
            Self::Connected => Err(ClientError::AlreadyConnected),
            Self::Disconnected | Self::Error => Ok(()),
        }
    }

    /// Whether commands can be sent.
    #[must_use]
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_check_connect() {
        assert!(ConnectionState::Disconnected.check_connect().is_ok());
        assert!(ConnectionState::Error.check_connect().is_ok());
        assert!(matches!(
            ConnectionState::Connecting.check_connect(),
            Err(ClientError::AlreadyConnecting)
        ));
        assert!(matches!(
            ConnectionState::Reconnecting.check_connect(),
            Err(ClientError::AlreadyConnecting)
        ));
        assert!(matches!(
            ConnectionState::Connected.check_connect(),
            Err(ClientError::AlreadyConnected)
        ));
    }
}
