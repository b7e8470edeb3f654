//! The connection task.
//!
//! One [`Connection`] runs per client on its own tokio task and owns the
//! socket, the timers, the [`ConnectionState`] and the [`Dispatcher`].
//! Handles talk to it through [`Request`]s; all mutation happens here, in
//! the order requests and server lines arrive.

use std::future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use encoding::Encoding;
use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant, Interval, MissedTickBehavior, Sleep, Timeout};
use tokio_util::codec::Framed;
use tracing::{debug, info, trace, warn};

use crate::command::OutboundCommand;
use crate::config::ClientConfig;
use crate::dispatch::{DispatchAction, Dispatcher};
use crate::error::{ClientError, Result};
use crate::event::{DomainEvent, EventSink};
use crate::irc::IrcCodec;
use crate::message::ParsedMessage;
use crate::session::Snapshot;
use crate::state::ConnectionState;
use crate::transport::Connector;

use super::reconnect::ReconnectPolicy;

/// A request from a [`ClientHandle`](super::ClientHandle).
#[derive(Debug)]
pub(crate) enum Request {
    Connect {
        host: String,
        port: u16,
        nick: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Disconnect {
        reply: oneshot::Sender<Result<()>>,
    },
    Send {
        command: OutboundCommand,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Publish a [`DomainEvent::SystemNotice`] in line with other events.
    Notice {
        content: String,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Where to connect and as whom.
#[derive(Clone, Debug)]
struct Target {
    host: String,
    port: u16,
    nick: String,
}

type ConnectFuture<S> = Pin<Box<Timeout<BoxFuture<'static, io::Result<S>>>>>;

/// What the task is currently waiting on besides requests.
enum Link<S> {
    Idle,
    Connecting {
        attempt: ConnectFuture<S>,
        timeout: Duration,
    },
    Open {
        framed: Framed<S, IrcCodec>,
        keepalive: Interval,
    },
    Backoff(Pin<Box<Sleep>>),
}

enum LinkEvent<S> {
    Established(S),
    ConnectFailed(ClientError),
    Line(String),
    Closed(Option<ClientError>),
    KeepaliveTick,
    BackoffElapsed,
}

impl<S> Link<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    /// Wait for the next thing to happen on the link.
    ///
    /// Cancel safe: every future awaited here is owned by `self`, so
    /// dropping this future loses nothing.
    async fn next_event(&mut self) -> LinkEvent<S> {
        match self {
            Link::Idle => future::pending().await,
            Link::Connecting { attempt, timeout } => match attempt.as_mut().await {
                Ok(Ok(stream)) => LinkEvent::Established(stream),
                Ok(Err(e)) => LinkEvent::ConnectFailed(e.into()),
                Err(_) => LinkEvent::ConnectFailed(ClientError::ConnectionTimeout(*timeout)),
            },
            Link::Open { framed, keepalive } => tokio::select! {
                frame = framed.next() => match frame {
                    Some(Ok(line)) => LinkEvent::Line(line),
                    Some(Err(e)) => LinkEvent::Closed(Some(e)),
                    None => LinkEvent::Closed(None),
                },
                _ = keepalive.tick() => LinkEvent::KeepaliveTick,
            },
            Link::Backoff(sleep) => {
                sleep.as_mut().await;
                LinkEvent::BackoffElapsed
            }
        }
    }

    fn is_idle(&self) -> bool {
        matches!(self, Link::Idle)
    }
}

/// The connection task's state.
pub(crate) struct Connection<C: Connector> {
    config: ClientConfig,
    connector: C,
    encoding: &'static Encoding,
    policy: ReconnectPolicy,
    requests: mpsc::Receiver<Request>,
    events: EventSink,
    snapshots: watch::Sender<Snapshot>,
    state: ConnectionState,
    link: Link<C::Stream>,
    dispatcher: Dispatcher,
    target: Option<Target>,
    /// Automatic attempts made since the last successful connection.
    attempts: u32,
    /// Last inbound PONG or outbound keepalive PING.
    last_keepalive: Instant,
    /// When the unanswered keepalive PING went out.
    ping_outstanding: Option<Instant>,
    /// A QUIT has been sent on the current link.
    quitting: bool,
}

impl<C: Connector> Connection<C> {
    pub(crate) fn new(
        config: ClientConfig,
        connector: C,
        encoding: &'static Encoding,
        requests: mpsc::Receiver<Request>,
        events: EventSink,
        snapshots: watch::Sender<Snapshot>,
    ) -> Self {
        Connection {
            policy: ReconnectPolicy::from_config(&config),
            dispatcher: Dispatcher::new(String::new(), config.case_mapping),
            config,
            connector,
            encoding,
            requests,
            events,
            snapshots,
            state: ConnectionState::Disconnected,
            link: Link::Idle,
            target: None,
            attempts: 0,
            last_keepalive: Instant::now(),
            ping_outstanding: None,
            quitting: false,
        }
    }

    /// Serve requests and link events until every handle is dropped.
    pub(crate) async fn run(mut self) {
        debug!("connection task started");
        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(request) => self.handle_request(request).await,
                    None => break,
                },
                event = self.link.next_event() => self.handle_link_event(event).await,
                () = self.events.flush(), if self.events.has_backlog() => {}
            }
        }

        self.link = Link::Idle;
        self.set_state(ConnectionState::Disconnected);
        debug!("all handles dropped, connection task exiting");
    }

    async fn handle_request(&mut self, request: Request) {
        match request {
            Request::Connect {
                host,
                port,
                nick,
                reply,
            } => {
                let result = self.connect(Target { host, port, nick });
                let _ = reply.send(result);
            }
            Request::Disconnect { reply } => {
                self.disconnect();
                let _ = reply.send(Ok(()));
            }
            Request::Send { command, reply } => {
                let result = self.send(command).await;
                let _ = reply.send(result);
            }
            Request::Notice { content, reply } => {
                self.events.emit(DomainEvent::notice(content));
                let _ = reply.send(Ok(()));
            }
        }
    }

    fn connect(&mut self, target: Target) -> Result<()> {
        self.state.check_connect()?;
        info!(host = %target.host, port = target.port, nick = %target.nick, "connecting");
        self.target = Some(target);
        self.attempts = 0;
        self.start_attempt();
        Ok(())
    }

    fn start_attempt(&mut self) {
        let Some(target) = &self.target else {
            self.link = Link::Idle;
            return;
        };
        let timeout = self.config.connect_timeout;
        let attempt = time::timeout(timeout, self.connector.connect(&target.host, target.port));
        self.link = Link::Connecting {
            attempt: Box::pin(attempt),
            timeout,
        };
        self.quitting = false;
        self.set_state(ConnectionState::Connecting);
    }

    fn disconnect(&mut self) {
        let was_active = !self.link.is_idle();
        self.link = Link::Idle;
        self.attempts = 0;
        self.ping_outstanding = None;
        self.clear_session();
        self.set_state(ConnectionState::Disconnected);
        if was_active {
            info!("disconnected by request");
            self.events.emit(DomainEvent::Disconnected);
        }
    }

    async fn send(&mut self, command: OutboundCommand) -> Result<()> {
        if !self.state.is_connected() {
            return Err(ClientError::NotConnected);
        }
        command.validate()?;

        let is_quit = command.command.eq_ignore_ascii_case("QUIT");
        if let Err(e) = self.write(command).await {
            self.link_lost(Some(e.clone()));
            return Err(e);
        }
        if is_quit {
            debug!("QUIT sent, reconnect suppressed for this link");
            self.quitting = true;
        }
        Ok(())
    }

    async fn write(&mut self, command: OutboundCommand) -> Result<()> {
        let Link::Open { framed, .. } = &mut self.link else {
            return Err(ClientError::NotConnected);
        };
        trace!(line = %command, "send");
        framed.send(command).await
    }

    async fn handle_link_event(&mut self, event: LinkEvent<C::Stream>) {
        match event {
            LinkEvent::Established(stream) => self.established(stream).await,
            LinkEvent::ConnectFailed(cause) => {
                warn!(error = %cause, "connection attempt failed");
                self.link = Link::Idle;
                self.set_state(ConnectionState::Error);
                self.events.emit(DomainEvent::Error { cause });
                self.schedule_reconnect();
            }
            LinkEvent::Line(line) => self.handle_line(line).await,
            LinkEvent::Closed(cause) => self.link_lost(cause),
            LinkEvent::KeepaliveTick => self.keepalive_tick().await,
            LinkEvent::BackoffElapsed => {
                debug!(attempt = self.attempts, "backoff elapsed");
                self.start_attempt();
            }
        }
    }

    async fn established(&mut self, stream: C::Stream) {
        let Some(target) = self.target.clone() else {
            self.link = Link::Idle;
            return;
        };
        info!(host = %target.host, port = target.port, "connection established");

        let mut framed = Framed::new(stream, IrcCodec::with_encoding(self.encoding));
        for command in [
            OutboundCommand::nick(target.nick.as_str()),
            OutboundCommand::user(&target.nick),
        ] {
            if let Err(e) = framed.send(command).await {
                warn!(error = %e, "registration failed");
                self.link = Link::Idle;
                self.set_state(ConnectionState::Error);
                self.events.emit(DomainEvent::Error { cause: e });
                self.schedule_reconnect();
                return;
            }
        }

        let period = self.config.keepalive_interval;
        let mut keepalive = time::interval_at(Instant::now() + period, period);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.last_keepalive = Instant::now();
        self.ping_outstanding = None;

        self.link = Link::Open { framed, keepalive };
        self.attempts = 0;
        self.dispatcher.reset(target.nick);
        self.set_state(ConnectionState::Connected);
        self.events.emit(DomainEvent::Connected);
    }

    async fn handle_line(&mut self, line: String) {
        trace!(%line, "recv");
        let msg = match ParsedMessage::parse(&line) {
            Ok(msg) => msg,
            Err(cause) => {
                warn!(%line, error = %cause, "skipping malformed line");
                let cause = ClientError::MalformedMessage { line, cause };
                self.events.emit(DomainEvent::Error { cause });
                return;
            }
        };

        // Publish the snapshot before the events so a consumer reacting to
        // an event never reads an older snapshot.
        let mut events = Vec::new();
        for action in self.dispatcher.feed(&msg) {
            match action {
                DispatchAction::Emit(event) => events.push(event),
                DispatchAction::Send(reply) => {
                    if let Err(e) = self.write(reply).await {
                        self.link_lost(Some(e));
                        return;
                    }
                }
                DispatchAction::KeepaliveAck => {
                    self.last_keepalive = Instant::now();
                    self.ping_outstanding = None;
                }
            }
        }
        if !events.is_empty() {
            self.publish();
            self.events.emit_all(events);
        }
    }

    async fn keepalive_tick(&mut self) {
        let now = Instant::now();
        let threshold = self.config.keepalive_threshold;

        if let Some(sent) = self.ping_outstanding {
            if now.duration_since(sent) > threshold {
                warn!(?threshold, "keepalive PING unanswered");
                self.link_lost(Some(ClientError::PingTimeout(threshold)));
                return;
            }
        }

        if now.duration_since(self.last_keepalive) > threshold {
            let host = self
                .target
                .as_ref()
                .map(|t| t.host.clone())
                .unwrap_or_default();
            debug!(%host, "sending keepalive PING");
            if let Err(e) = self.write(OutboundCommand::ping(&host)).await {
                self.link_lost(Some(e));
                return;
            }
            self.last_keepalive = now;
            self.ping_outstanding.get_or_insert(now);
        }
    }

    /// The open link failed or the server closed it.
    fn link_lost(&mut self, cause: Option<ClientError>) {
        match &cause {
            Some(e) => warn!(error = %e, "connection lost"),
            None => info!("connection closed by server"),
        }
        self.link = Link::Idle;
        self.ping_outstanding = None;
        self.clear_session();

        if let Some(cause) = cause {
            self.set_state(ConnectionState::Error);
            self.events.emit(DomainEvent::Error { cause });
        }
        self.set_state(ConnectionState::Disconnected);
        self.events.emit(DomainEvent::Disconnected);

        if self.quitting {
            debug!("not reconnecting after QUIT");
            return;
        }
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if !self.policy.enabled() || self.target.is_none() {
            return;
        }
        if self.policy.exhausted(self.attempts) {
            warn!(attempts = self.attempts, "giving up on reconnecting");
            self.link = Link::Idle;
            self.set_state(ConnectionState::Disconnected);
            self.events.emit(DomainEvent::ReconnectFailed);
            return;
        }

        self.attempts += 1;
        let delay = self.policy.delay(self.attempts);
        info!(attempt = self.attempts, ?delay, "scheduling reconnect");
        self.link = Link::Backoff(Box::pin(time::sleep(delay)));
        self.set_state(ConnectionState::Reconnecting);
        self.events.emit(DomainEvent::Reconnecting {
            attempt: self.attempts,
        });
    }

    /// Forget the channels of a link that is gone, keeping the nick.
    fn clear_session(&mut self) {
        let nick = self.dispatcher.session().nick().to_owned();
        self.dispatcher.reset(nick);
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "state change");
            self.state = state;
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshots
            .send_replace(self.dispatcher.snapshot(self.state));
    }
}
