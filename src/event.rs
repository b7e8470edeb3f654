//! Events published to the UI.

use crate::error::ClientError;
use crate::session::User;

/// Whether a chat line arrived as PRIVMSG or NOTICE.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageKind {
    /// `PRIVMSG`
    Message,
    /// `NOTICE`
    Notice,
}

/// Everything the client reports to its consumer, in protocol order.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum DomainEvent {
    /// Registration lines were sent on a fresh connection.
    Connected,
    /// The link went away.
    Disconnected,
    /// A connection-level failure or an unparseable inbound line.
    Error {
        /// What went wrong.
        cause: ClientError,
    },
    /// An automatic reconnect attempt has been scheduled.
    Reconnecting {
        /// 1-based attempt number.
        attempt: u32,
    },
    /// The reconnect budget is spent; no further automatic attempts.
    ReconnectFailed,
    /// A PRIVMSG or NOTICE.
    Message {
        /// Sender nick, or `"system"` when the line had no prefix.
        nick: String,
        /// Channel name or our own nick.
        target: String,
        /// Message body.
        content: String,
        /// PRIVMSG or NOTICE.
        kind: MessageKind,
    },
    /// Someone (possibly us) joined a channel.
    Join {
        /// Joining nick.
        nick: String,
        /// Channel joined.
        channel: String,
    },
    /// Someone (possibly us) left a channel.
    Part {
        /// Leaving nick.
        nick: String,
        /// Channel left.
        channel: String,
        /// Part message, if any.
        reason: Option<String>,
    },
    /// Someone disconnected from the network.
    Quit {
        /// Quitting nick.
        nick: String,
        /// Quit message, if any.
        reason: Option<String>,
        /// Channels whose roster contained the nick.
        affected_channels: Vec<String>,
    },
    /// Someone was kicked from a channel.
    Kick {
        /// Channel.
        channel: String,
        /// Kicked nick.
        nick: String,
        /// Who kicked them.
        by: String,
        /// Kick message, if any.
        reason: Option<String>,
    },
    /// The roster of a channel changed after a NAMES reply.
    NamesUpdated {
        /// Channel.
        channel: String,
        /// Full roster after the merge.
        users: Vec<User>,
    },
    /// A channel topic was reported or changed.
    TopicChanged {
        /// Channel.
        channel: String,
        /// New topic.
        topic: String,
    },
    /// Someone (possibly us) changed nick.
    NickChanged {
        /// Previous nick.
        old_nick: String,
        /// New nick.
        new_nick: String,
    },
    /// Server or client text with no better destination.
    SystemNotice {
        /// Text to show.
        content: String,
    },
}

impl DomainEvent {
    /// Shorthand for a [`DomainEvent::SystemNotice`].
    pub fn notice(content: impl Into<String>) -> Self {
        DomainEvent::SystemNotice {
            content: content.into(),
        }
    }
}

impl From<ClientError> for DomainEvent {
    fn from(cause: ClientError) -> Self {
        DomainEvent::Error { cause }
    }
}

#[cfg(feature = "tokio")]
pub use self::sink::EventSink;

#[cfg(feature = "tokio")]
mod sink {
    use std::collections::VecDeque;

    use tokio::sync::mpsc;
    use tracing::{debug, trace, warn};

    use super::DomainEvent;

    /// Sending half of the event channel.
    ///
    /// Emitting never waits. When the bounded channel is full, events queue
    /// up in a local backlog that [`flush`](EventSink::flush) moves into the
    /// channel as the receiver catches up, so order is kept while a
    /// receiver exists.
    #[derive(Debug)]
    pub struct EventSink {
        tx: mpsc::Sender<DomainEvent>,
        backlog: VecDeque<DomainEvent>,
    }

    impl EventSink {
        /// Create a sink and its receiver with room for `capacity` events.
        #[must_use]
        pub fn channel(capacity: usize) -> (EventSink, mpsc::Receiver<DomainEvent>) {
            let (tx, rx) = mpsc::channel(capacity.max(1));
            let sink = EventSink {
                tx,
                backlog: VecDeque::new(),
            };
            (sink, rx)
        }

        /// Deliver one event, or queue it if the channel is full.
        ///
        /// Returns `false` if the receiver is gone.
        pub fn emit(&mut self, event: DomainEvent) -> bool {
            trace!(?event, "emit");
            if !self.backlog.is_empty() {
                self.backlog.push_back(event);
                return !self.tx.is_closed();
            }
            match self.tx.try_send(event) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(event)) => {
                    warn!("event receiver is not keeping up, buffering events");
                    self.backlog.push_back(event);
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("event receiver dropped");
                    false
                }
            }
        }

        /// Deliver events in order.
        pub fn emit_all(&mut self, events: impl IntoIterator<Item = DomainEvent>) {
            for event in events {
                if !self.emit(event) {
                    return;
                }
            }
        }

        /// Whether events are waiting for room in the channel.
        #[must_use]
        pub fn has_backlog(&self) -> bool {
            !self.backlog.is_empty()
        }

        /// Number of events waiting for room in the channel.
        #[must_use]
        pub fn backlog_len(&self) -> usize {
            self.backlog.len()
        }

        /// Move backlogged events into the channel as room frees up.
        ///
        /// Cancel safe: an event leaves the backlog only together with the
        /// permit that sends it.
        pub async fn flush(&mut self) {
            while !self.backlog.is_empty() {
                let Ok(permit) = self.tx.reserve().await else {
                    debug!(dropped = self.backlog.len(), "event receiver dropped");
                    self.backlog.clear();
                    return;
                };
                if let Some(event) = self.backlog.pop_front() {
                    permit.send(event);
                }
            }
            debug!("event backlog drained");
        }

        /// Whether the receiver has been dropped.
        #[must_use]
        pub fn is_closed(&self) -> bool {
            self.tx.is_closed()
        }
    }

}
