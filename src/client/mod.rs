//! Async client: a cloneable [`ClientHandle`] in front of a connection task.
//!
//! ```no_run
//! use slirc_client::client;
//! use slirc_client::{ClientConfig, DomainEvent};
//!
//! # async fn run() -> slirc_client::Result<()> {
//! let (handle, mut events) = client::spawn(ClientConfig::default())?;
//! handle.connect("irc.libera.chat", 6667, "slirc").await?;
//!
//! while let Some(event) = events.recv().await {
//!     if let DomainEvent::Connected = event {
//!         handle.join("rust").await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod connection;
mod reconnect;

use tokio::sync::{mpsc, oneshot, watch};

use crate::command::{OutboundCommand, SlashCommand, HELP_TEXT};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::event::{DomainEvent, EventSink};
use crate::session::Snapshot;
use crate::state::ConnectionState;
use crate::transport::{Connector, TcpConnector};

use self::connection::{Connection, Request};

pub use self::reconnect::ReconnectPolicy;

/// Spawn a client that connects over TCP.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// [`ClientError::InvalidArgument`] if the configuration is unusable.
pub fn spawn(config: ClientConfig) -> Result<(ClientHandle, mpsc::Receiver<DomainEvent>)> {
    spawn_with(config, TcpConnector)
}

/// Spawn a client that obtains its streams from `connector`.
///
/// # Errors
///
/// [`ClientError::InvalidArgument`] if the configuration is unusable.
pub fn spawn_with<C: Connector>(
    config: ClientConfig,
    connector: C,
) -> Result<(ClientHandle, mpsc::Receiver<DomainEvent>)> {
    let encoding = config.validate()?;

    let (events, event_rx) = EventSink::channel(config.event_capacity);
    let (request_tx, request_rx) = mpsc::channel(config.request_capacity.max(1));
    let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());

    let connection = Connection::new(config, connector, encoding, request_rx, events, snapshot_tx);
    tokio::spawn(connection.run());

    let handle = ClientHandle {
        requests: request_tx,
        snapshots: snapshot_rx,
    };
    Ok((handle, event_rx))
}

/// Cheap, cloneable front end to a running client.
///
/// Requests are queued in order. Errors the caller can act on come back
/// from each method; everything that happens later on the connection
/// arrives as a [`DomainEvent`].
#[derive(Clone, Debug)]
pub struct ClientHandle {
    requests: mpsc::Sender<Request>,
    snapshots: watch::Receiver<Snapshot>,
}

impl ClientHandle {
    async fn request(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<()>>) -> Request,
    ) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(make(reply))
            .await
            .map_err(|_| ClientError::Shutdown)?;
        rx.await.map_err(|_| ClientError::Shutdown)?
    }

    /// Start connecting to `host:port` as `nick`.
    ///
    /// Returns once the attempt has started; the outcome arrives as
    /// [`DomainEvent::Connected`] or [`DomainEvent::Error`].
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidArgument`] for an empty host, port 0 or a bad
    /// nick, [`ClientError::AlreadyConnecting`] or
    /// [`ClientError::AlreadyConnected`] if a connection is in progress.
    pub async fn connect(&self, host: &str, port: u16, nick: &str) -> Result<()> {
        validate_target(host, port, nick)?;
        self.request(|reply| Request::Connect {
            host: host.to_owned(),
            port,
            nick: nick.to_owned(),
            reply,
        })
        .await
    }

    /// Drop the connection and cancel any pending reconnect.
    ///
    /// # Errors
    ///
    /// [`ClientError::Shutdown`] if the connection task is gone.
    pub async fn disconnect(&self) -> Result<()> {
        self.request(|reply| Request::Disconnect { reply }).await
    }

    /// Write a command to the server.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] outside the connected state,
    /// [`ClientError::InvalidArgument`] if the command would corrupt the
    /// stream, [`ClientError::Socket`] if the write failed.
    pub async fn send(&self, command: OutboundCommand) -> Result<()> {
        self.request(|reply| Request::Send { command, reply }).await
    }

    /// Join a channel; `#` is added to bare names.
    pub async fn join(&self, channel: &str) -> Result<()> {
        self.send(OutboundCommand::join(channel)).await
    }

    /// Leave a channel.
    pub async fn part(&self, channel: &str, reason: Option<&str>) -> Result<()> {
        self.send(OutboundCommand::part(channel, reason)).await
    }

    /// Send a PRIVMSG.
    pub async fn privmsg(&self, target: &str, text: &str) -> Result<()> {
        self.send(OutboundCommand::privmsg(target, text)).await
    }

    /// Send a chat message to a channel or nick.
    ///
    /// Nothing is echoed locally: the message shows up as an event only if
    /// the server relays it back.
    pub async fn send_message(&self, target: &str, text: &str) -> Result<()> {
        self.privmsg(target, text).await
    }

    /// Ask the server for a new nick.
    pub async fn nick(&self, nick: &str) -> Result<()> {
        validate_nick(nick)?;
        self.send(OutboundCommand::nick(nick)).await
    }

    /// Send QUIT. The server then closes the link and no reconnect follows.
    pub async fn quit(&self, reason: Option<&str>) -> Result<()> {
        self.send(OutboundCommand::quit(reason)).await
    }

    /// Request the channel list.
    pub async fn list(&self) -> Result<()> {
        self.send(OutboundCommand::list()).await
    }

    /// Publish a [`DomainEvent::SystemNotice`] in order with other events.
    pub async fn notice(&self, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        self.request(|reply| Request::Notice { content, reply }).await
    }

    /// Run one line of slash-command input such as `/join #rust`.
    ///
    /// `/help` and unknown commands produce a
    /// [`DomainEvent::SystemNotice`].
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidArgument`] for input that is not a slash
    /// command or lacks required arguments, plus whatever the underlying
    /// request returns.
    pub async fn execute(&self, input: &str) -> Result<()> {
        match SlashCommand::parse(input)? {
            SlashCommand::Join(channel) => self.join(&channel).await,
            SlashCommand::Part { channel, reason } => self.part(&channel, reason.as_deref()).await,
            SlashCommand::Msg { target, text } => self.privmsg(&target, &text).await,
            SlashCommand::Nick(nick) => self.nick(&nick).await,
            SlashCommand::Quit(reason) => self.quit(reason.as_deref()).await,
            SlashCommand::List => self.list().await,
            SlashCommand::Help => self.notice(HELP_TEXT).await,
            SlashCommand::Unknown(word) => {
                self.notice(format!("Unknown command: /{word}. Type /help for a list."))
                    .await
            }
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.snapshots.borrow().connection
    }

    /// Copy of the latest published session view.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified whenever a new snapshot is published.
    #[must_use]
    pub fn watch_snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }
}

fn validate_target(host: &str, port: u16, nick: &str) -> Result<()> {
    if host.trim().is_empty() || host.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ClientError::InvalidArgument(format!("invalid host {host:?}")));
    }
    if port == 0 {
        return Err(ClientError::InvalidArgument(
            "port must be between 1 and 65535".to_owned(),
        ));
    }
    validate_nick(nick)
}

fn validate_nick(nick: &str) -> Result<()> {
    if nick.is_empty()
        || nick.starts_with(':')
        || nick.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(ClientError::InvalidArgument(format!("invalid nick {nick:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_target() {
        assert!(validate_target("irc.example.com", 6667, "me").is_ok());
        assert!(validate_target("", 6667, "me").is_err());
        assert!(validate_target("irc.example.com", 0, "me").is_err());
        assert!(validate_target("irc.example.com", 6667, "").is_err());
        assert!(validate_target("irc.example.com", 6667, "two words").is_err());
        assert!(validate_target("irc.example.com", 6667, ":me").is_err());
    }
}
