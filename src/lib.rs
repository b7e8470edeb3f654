//! # slirc-client
//!
//! An async IRC client core: it keeps one connection to one server alive,
//! turns user intents into protocol lines and turns server lines into
//! structured events and channel state.
//!
//! ## Features
//!
//! - IRC line parsing and formatting (prefix, command, up to 15 parameters)
//! - Line framing with a carry-over buffer and configurable charset
//! - Connection manager with connect timeout, PING keepalive and
//!   linear-backoff reconnect
//! - Protocol dispatcher tracking channels, topics and rosters with modes
//! - Configurable nick/channel case mapping
//! - Slash-command parsing (`/join`, `/part`, `/msg`, `/nick`, `/quit`, ...)

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Parsing and formatting lines
//!
//! ```rust
//! use slirc_client::{OutboundCommand, ParsedMessage};
//!
//! let msg: ParsedMessage = ":nick!u@h PRIVMSG #test :Hello world".parse().unwrap();
//! assert_eq!(msg.source_nick(), "nick");
//! assert_eq!(msg.params, vec!["#test", "Hello world"]);
//!
//! assert_eq!(OutboundCommand::join("test").to_string(), "JOIN #test");
//! ```
//!
//! ### Running a client
//!
//! ```no_run
//! use slirc_client::{client, ClientConfig, DomainEvent};
//!
//! # #[tokio::main]
//! # async fn main() -> slirc_client::Result<()> {
//! let (handle, mut events) = client::spawn(ClientConfig::default())?;
//! handle.connect("irc.libera.chat", 6667, "slirc").await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         DomainEvent::Connected => handle.execute("/join #rust").await?,
//!         DomainEvent::Message { nick, target, content, .. } => {
//!             println!("[{target}] <{nick}> {content}");
//!         }
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod casemap;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod event;
pub mod message;
pub mod prefix;
pub mod session;
pub mod state;
pub mod util;

#[cfg(feature = "tokio")]
pub mod client;
#[cfg(feature = "tokio")]
pub mod irc;
#[cfg(feature = "tokio")]
pub mod transport;

pub use self::casemap::{irc_eq, irc_to_lower, CaseMapping};
pub use self::command::{OutboundCommand, SlashCommand};
pub use self::config::ClientConfig;
pub use self::dispatch::{DispatchAction, Dispatcher};
pub use self::encode::IrcEncode;
pub use self::error::{ClientError, MessageParseError, Result};
pub use self::event::{DomainEvent, MessageKind};
pub use self::message::ParsedMessage;
pub use self::prefix::{is_channel_name, nick_from_prefix};
pub use self::session::{Channel, SessionState, Snapshot, User};
pub use self::state::ConnectionState;

#[cfg(feature = "tokio")]
pub use self::client::{spawn, spawn_with, ClientHandle};
#[cfg(feature = "tokio")]
pub use self::event::EventSink;
#[cfg(feature = "tokio")]
pub use self::irc::IrcCodec;
#[cfg(feature = "tokio")]
pub use self::transport::{Connector, TcpConnector, MAX_IRC_LINE_LEN};
