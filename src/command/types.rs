//! Outbound IRC command type.
//!
//! [`OutboundCommand`] is what the client writes to the server. The named
//! constructors cover every intent the client issues on its own or on
//! behalf of the UI; [`OutboundCommand::new`] builds anything else.

use crate::error::ClientError;
use crate::prefix::is_channel_name;

/// A command to be written to the server.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutboundCommand {
    /// Command word, e.g. `PRIVMSG`.
    pub command: String,
    /// Parameters in order.
    pub params: Vec<String>,
    /// Always colon-prefix the last parameter.
    pub trailing: bool,
}

impl OutboundCommand {
    /// Build an arbitrary command. The last parameter is colon-prefixed
    /// only when its content requires it.
    pub fn new<C, I, P>(command: C, params: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        OutboundCommand {
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
            trailing: false,
        }
    }

    /// Mark the last parameter as trailing.
    #[must_use]
    pub fn with_trailing(mut self) -> Self {
        self.trailing = true;
        self
    }

    /// `NICK <nick>`
    pub fn nick(nick: impl Into<String>) -> Self {
        Self::new("NICK", [nick.into()])
    }

    /// `USER <nick> 0 * <nick>`, the registration line sent after `NICK`.
    pub fn user(nick: &str) -> Self {
        Self::new("USER", [nick, "0", "*", nick])
    }

    /// `JOIN <channel>`, prefixing `#` when the name is not a channel name.
    pub fn join(channel: &str) -> Self {
        if is_channel_name(channel) {
            Self::new("JOIN", [channel])
        } else {
            Self::new("JOIN", [format!("#{channel}")])
        }
    }

    /// `PART <channel> [:reason]`
    pub fn part(channel: &str, reason: Option<&str>) -> Self {
        match reason {
            Some(reason) => Self::new("PART", [channel, reason]).with_trailing(),
            None => Self::new("PART", [channel]),
        }
    }

    /// `PRIVMSG <target> :<text>`
    pub fn privmsg(target: &str, text: &str) -> Self {
        Self::new("PRIVMSG", [target, text]).with_trailing()
    }

    /// `QUIT [:reason]`
    pub fn quit(reason: Option<&str>) -> Self {
        match reason {
            Some(reason) => Self::new("QUIT", [reason]).with_trailing(),
            None => Self::new("QUIT", Vec::<String>::new()),
        }
    }

    /// `PING :<token>`
    pub fn ping(token: &str) -> Self {
        Self::new("PING", [token]).with_trailing()
    }

    /// `PONG` echoing the parameters of a server `PING`.
    pub fn pong<S: AsRef<str>>(params: &[S]) -> Self {
        let cmd = Self::new("PONG", params.iter().map(|p| p.as_ref().to_owned()));
        if cmd.params.is_empty() {
            cmd
        } else {
            cmd.with_trailing()
        }
    }

    /// `LIST`
    pub fn list() -> Self {
        Self::new("LIST", Vec::<String>::new())
    }

    /// Check that the command can be written without corrupting the stream.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidArgument`] if the command word is empty or not
    /// alphanumeric, if any parameter contains CR, LF or NUL, or if a
    /// parameter other than the last is empty, contains a space, or starts
    /// with `:`.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.command.is_empty() || !self.command.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ClientError::InvalidArgument(format!(
                "invalid command word {:?}",
                self.command
            )));
        }

        if let Some(bad) = self
            .params
            .iter()
            .find(|p| p.contains(['\r', '\n', '\0']))
        {
            return Err(ClientError::InvalidArgument(format!(
                "parameter {bad:?} contains a line break or NUL"
            )));
        }

        if let Some((_, middle)) = self.params.split_last() {
            if let Some(bad) = middle
                .iter()
                .find(|p| p.is_empty() || p.contains(' ') || p.starts_with(':'))
            {
                return Err(ClientError::InvalidArgument(format!(
                    "middle parameter {bad:?} must be a single non-empty word"
                )));
            }
        }

        Ok(())
    }
}
