//! Protocol dispatcher: turns parsed server lines into session updates,
//! domain events and protocol replies.
//!
//! The dispatcher performs no I/O. Like a sans-IO state machine it consumes
//! [`ParsedMessage`]s and returns [`DispatchAction`]s for the connection
//! task to carry out.
//!
//! ```
//! use slirc_client::dispatch::{DispatchAction, Dispatcher};
//! use slirc_client::{CaseMapping, DomainEvent, ParsedMessage};
//!
//! let mut dispatcher = Dispatcher::new("me", CaseMapping::Rfc1459);
//! let msg = ParsedMessage::parse(":nick!u@h PRIVMSG #test :Hello world").unwrap();
//!
//! let actions = dispatcher.feed(&msg);
//! assert!(matches!(
//!     &actions[..],
//!     [DispatchAction::Emit(DomainEvent::Message { content, .. })] if content == "Hello world"
//! ));
//! assert!(dispatcher.session().channel("#test").is_some());
//! ```

use tracing::{debug, trace};

use crate::casemap::CaseMapping;
use crate::command::OutboundCommand;
use crate::event::{DomainEvent, MessageKind};
use crate::message::ParsedMessage;
use crate::prefix::is_channel_name;
use crate::session::{SessionState, Snapshot, User};
use crate::state::ConnectionState;

/// Something the connection task must do in response to a server line.
#[derive(Clone, Debug)]
pub enum DispatchAction {
    /// Publish an event to the UI.
    Emit(DomainEvent),
    /// Write a command to the server.
    Send(OutboundCommand),
    /// The server answered a keepalive PING.
    KeepaliveAck,
}

/// NAMES reply prefix characters and the mode each one grants.
const NAMES_PREFIXES: &[(char, &str)] = &[
    ('~', "owner"),
    ('&', "admin"),
    ('@', "op"),
    ('%', "halfop"),
    ('+', "voice"),
];

/// Owns the [`SessionState`] and applies server lines to it.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    session: SessionState,
}

impl Dispatcher {
    /// A dispatcher with an empty session.
    pub fn new(nick: impl Into<String>, case_mapping: CaseMapping) -> Self {
        Dispatcher {
            session: SessionState::new(nick, case_mapping),
        }
    }

    /// Read access to the session.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Start over for a new connection.
    pub fn reset(&mut self, nick: impl Into<String>) {
        self.session.reset(nick);
    }

    /// Copy of the session for the UI.
    #[must_use]
    pub fn snapshot(&self, connection: ConnectionState) -> Snapshot {
        self.session.snapshot(connection)
    }

    /// Apply one server line.
    ///
    /// Lines with missing parameters, unknown commands, and numerics that
    /// carry no state are ignored.
    pub fn feed(&mut self, msg: &ParsedMessage) -> Vec<DispatchAction> {
        if let Some(code) = msg.numeric() {
            return self.on_numeric(code, msg);
        }

        let cmd = msg.command.to_ascii_uppercase();
        let event = match cmd.as_str() {
            "PING" => return vec![DispatchAction::Send(OutboundCommand::pong(&msg.params))],
            "PONG" => return vec![DispatchAction::KeepaliveAck],
            "JOIN" => self.on_join(msg),
            "PART" => self.on_part(msg),
            "PRIVMSG" => self.on_message(msg, MessageKind::Message),
            "NOTICE" => self.on_message(msg, MessageKind::Notice),
            "QUIT" => self.on_quit(msg),
            "NICK" => self.on_nick(msg),
            "TOPIC" => self.on_topic(msg),
            "KICK" => self.on_kick(msg),
            "ERROR" => Some(DomainEvent::notice(msg.params.join(" "))),
            _ => {
                trace!(command = %msg.command, "unhandled command");
                None
            }
        };

        event.map(DispatchAction::Emit).into_iter().collect()
    }

    fn on_numeric(&mut self, code: u16, msg: &ParsedMessage) -> Vec<DispatchAction> {
        let event = match code {
            1..=5 => {
                if code == 1 {
                    if let Some(nick) = msg.param(0).filter(|n| !n.is_empty() && *n != "*") {
                        self.session.set_nick(nick);
                    }
                }
                Some(DomainEvent::notice(join_from(&msg.params, 1)))
            }
            332 => self.on_topic_reply(msg),
            353 => self.on_names(msg),
            366 => None,
            400..=599 => Some(DomainEvent::notice(join_from(&msg.params, 1))),
            _ => {
                trace!(code, "unhandled numeric");
                None
            }
        };
        event.map(DispatchAction::Emit).into_iter().collect()
    }

    fn on_join(&mut self, msg: &ParsedMessage) -> Option<DomainEvent> {
        let channel = msg.param(0)?;
        let nick = msg.source_nick();
        self.session.ensure_channel(channel).insert(User::new(nick));
        debug!(nick, channel, "join");
        Some(DomainEvent::Join {
            nick: nick.to_owned(),
            channel: channel.to_owned(),
        })
    }

    fn on_part(&mut self, msg: &ParsedMessage) -> Option<DomainEvent> {
        let channel = msg.param(0)?;
        let nick = msg.source_nick();
        if self.session.is_me(nick) {
            self.session.remove_channel(channel);
        } else if let Some(chan) = self.session.channel_mut(channel) {
            chan.remove(nick);
        }
        Some(DomainEvent::Part {
            nick: nick.to_owned(),
            channel: channel.to_owned(),
            reason: msg.param(1).map(str::to_owned),
        })
    }

    fn on_message(&mut self, msg: &ParsedMessage, kind: MessageKind) -> Option<DomainEvent> {
        let target = msg.param(0)?;
        let content = msg.param(1)?;
        if is_channel_name(target) {
            self.session.ensure_channel(target);
        }
        Some(DomainEvent::Message {
            nick: msg.source_nick().to_owned(),
            target: target.to_owned(),
            content: content.to_owned(),
            kind,
        })
    }

    fn on_quit(&mut self, msg: &ParsedMessage) -> Option<DomainEvent> {
        let nick = msg.source_nick();
        let affected_channels = self.session.remove_user_everywhere(nick);
        Some(DomainEvent::Quit {
            nick: nick.to_owned(),
            reason: msg.param(0).map(str::to_owned),
            affected_channels,
        })
    }

    fn on_nick(&mut self, msg: &ParsedMessage) -> Option<DomainEvent> {
        let new_nick = msg.param(0).filter(|n| !n.is_empty())?;
        let old_nick = msg.source_nick();
        if self.session.is_me(old_nick) {
            self.session.set_nick(new_nick);
        }
        self.session.rename_user_everywhere(old_nick, new_nick);
        Some(DomainEvent::NickChanged {
            old_nick: old_nick.to_owned(),
            new_nick: new_nick.to_owned(),
        })
    }

    fn on_topic(&mut self, msg: &ParsedMessage) -> Option<DomainEvent> {
        let channel = msg.param(0)?;
        let topic = msg.param(1).unwrap_or_default();
        Some(self.set_topic(channel, topic))
    }

    fn on_topic_reply(&mut self, msg: &ParsedMessage) -> Option<DomainEvent> {
        let channel = msg.param(1)?;
        let topic = msg.param(2)?;
        Some(self.set_topic(channel, topic))
    }

    fn set_topic(&mut self, channel: &str, topic: &str) -> DomainEvent {
        let chan = self.session.ensure_channel(channel);
        chan.topic = Some(topic.to_owned());
        DomainEvent::TopicChanged {
            channel: chan.name.clone(),
            topic: topic.to_owned(),
        }
    }

    fn on_kick(&mut self, msg: &ParsedMessage) -> Option<DomainEvent> {
        let channel = msg.param(0)?;
        let nick = msg.param(1)?;
        if self.session.is_me(nick) {
            self.session.remove_channel(channel);
        } else if let Some(chan) = self.session.channel_mut(channel) {
            chan.remove(nick);
        }
        Some(DomainEvent::Kick {
            channel: channel.to_owned(),
            nick: nick.to_owned(),
            by: msg.source_nick().to_owned(),
            reason: msg.param(2).map(str::to_owned),
        })
    }

    fn on_names(&mut self, msg: &ParsedMessage) -> Option<DomainEvent> {
        let channel = msg.param(2)?;
        let names = msg.param(3)?;

        let chan = self.session.ensure_channel(channel);
        for entry in names.split_whitespace() {
            if let Some(user) = parse_names_entry(entry) {
                chan.insert(user);
            }
        }

        Some(DomainEvent::NamesUpdated {
            channel: chan.name.clone(),
            users: chan.roster(),
        })
    }
}

/// Split one NAMES entry such as `@+alice` into a [`User`].
fn parse_names_entry(entry: &str) -> Option<User> {
    let mut user = User::new("");
    let mut rest = entry;
    while let Some(c) = rest.chars().next() {
        let Some((_, mode)) = NAMES_PREFIXES.iter().find(|(p, _)| *p == c) else {
            break;
        };
        user.modes.insert((*mode).to_owned());
        rest = &rest[c.len_utf8()..];
    }
    if rest.is_empty() {
        return None;
    }
    user.nick = rest.to_owned();
    Some(user)
}

fn join_from(params: &[String], start: usize) -> String {
    params.get(start..).unwrap_or_default().join(" ")
}
