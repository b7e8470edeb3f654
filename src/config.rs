//! Client configuration.

use std::time::Duration;

use encoding::Encoding;

use crate::casemap::CaseMapping;
use crate::error::{ClientError, Result};

/// Tunables injected when the client is spawned.
///
/// ```
/// use std::time::Duration;
/// use slirc_client::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_max_reconnect_attempts(3)
///     .with_reconnect_base_delay(Duration::from_secs(2));
/// assert_eq!(config.connect_timeout, Duration::from_secs(30));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    /// Upper bound on establishing the TCP connection.
    pub connect_timeout: Duration,
    /// How often the keepalive check runs.
    pub keepalive_interval: Duration,
    /// Silence after which a PING is sent, and how long a PING may stay
    /// unanswered before the link is declared dead.
    pub keepalive_threshold: Duration,
    /// Automatic reconnect attempts after a failure; 0 disables them.
    pub max_reconnect_attempts: u32,
    /// Attempt `n` waits `n` times this long.
    pub reconnect_base_delay: Duration,
    /// Capacity of the event channel.
    pub event_capacity: usize,
    /// Capacity of the request channel between handles and the connection task.
    pub request_capacity: usize,
    /// Character encoding label for the wire, e.g. `"utf-8"` or `"latin1"`.
    pub encoding: String,
    /// How nicks and channel names are compared.
    pub case_mapping: CaseMapping,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            connect_timeout: Duration::from_secs(30),
            keepalive_interval: Duration::from_secs(60),
            keepalive_threshold: Duration::from_secs(180),
            max_reconnect_attempts: 5,
            reconnect_base_delay: Duration::from_secs(5),
            event_capacity: 1024,
            request_capacity: 64,
            encoding: "utf-8".to_owned(),
            case_mapping: CaseMapping::Rfc1459,
        }
    }
}

impl ClientConfig {
    /// Check the configuration and resolve the wire encoding.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidArgument`] for an unknown encoding label or a
    /// zero keepalive interval.
    pub fn validate(&self) -> Result<&'static Encoding> {
        if self.keepalive_interval.is_zero() {
            return Err(ClientError::InvalidArgument(
                "keepalive_interval must be non-zero".to_owned(),
            ));
        }
        Encoding::for_label(self.encoding.trim().as_bytes()).ok_or_else(|| {
            ClientError::InvalidArgument(format!("unknown encoding: {:?}", self.encoding))
        })
    }

    /// Set [`connect_timeout`](Self::connect_timeout).
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set [`keepalive_interval`](Self::keepalive_interval).
    #[must_use]
    pub fn with_keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval;
        self
    }

    /// Set [`keepalive_threshold`](Self::keepalive_threshold).
    #[must_use]
    pub fn with_keepalive_threshold(mut self, threshold: Duration) -> Self {
        self.keepalive_threshold = threshold;
        self
    }

    /// Set [`max_reconnect_attempts`](Self::max_reconnect_attempts).
    #[must_use]
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Set [`reconnect_base_delay`](Self::reconnect_base_delay).
    #[must_use]
    pub fn with_reconnect_base_delay(mut self, delay: Duration) -> Self {
        self.reconnect_base_delay = delay;
        self
    }

    /// Set [`event_capacity`](Self::event_capacity).
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Set [`encoding`](Self::encoding).
    #[must_use]
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }

    /// Set [`case_mapping`](Self::case_mapping).
    #[must_use]
    pub fn with_case_mapping(mut self, case_mapping: CaseMapping) -> Self {
        self.case_mapping = case_mapping;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.keepalive_interval, Duration::from_secs(60));
        assert_eq!(config.keepalive_threshold, Duration::from_secs(180));
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.reconnect_base_delay, Duration::from_secs(5));
        assert_eq!(config.encoding, "utf-8");
        assert_eq!(config.case_mapping, CaseMapping::Rfc1459);
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::default()
            .with_connect_timeout(Duration::from_secs(1))
            .with_max_reconnect_attempts(0)
            .with_encoding("latin1")
            .with_case_mapping(CaseMapping::Strict);
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.max_reconnect_attempts, 0);
        assert_eq!(config.encoding, "latin1");
        assert_eq!(config.case_mapping, CaseMapping::Strict);
    }

    #[test]
    fn test_validate() {
        assert_eq!(ClientConfig::default().validate().unwrap(), encoding::UTF_8);
        assert!(ClientConfig::default().with_encoding("nope").validate().is_err());
        assert!(ClientConfig::default()
            .with_keepalive_interval(Duration::ZERO)
            .validate()
            .is_err());
    }
}
