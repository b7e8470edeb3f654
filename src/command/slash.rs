//! Slash-command parsing for user input.
//!
//! The UI hands lines such as `/nick newname` to
//! [`ClientHandle::execute`](crate::client::ClientHandle::execute), which
//! parses them with [`SlashCommand::parse`].

use crate::error::ClientError;

/// Text shown for `/help`.
pub const HELP_TEXT: &str = "Commands: /join <channel>, /part <channel> [reason], \
/msg <target> <text>, /nick <nick>, /list, /quit [reason], /help";

/// A parsed slash command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlashCommand {
    /// `/join <channel>`
    Join(String),
    /// `/part <channel> [reason]`
    Part {
        /// Channel to leave.
        channel: String,
        /// Optional part message.
        reason: Option<String>,
    },
    /// `/msg <target> <text>`
    Msg {
        /// Nick or channel.
        target: String,
        /// Message body.
        text: String,
    },
    /// `/nick <nick>`
    Nick(String),
    /// `/quit [reason]`
    Quit(Option<String>),
    /// `/list`
    List,
    /// `/help`
    Help,
    /// Anything else; carries the command word without the slash.
    Unknown(String),
}

impl SlashCommand {
    /// Parse one line of user input.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidArgument`] if the line does not start with `/`
    /// or a known command is missing a required argument.
    pub fn parse(input: &str) -> Result<Self, ClientError> {
        let input = input.trim();
        let body = input.strip_prefix('/').ok_or_else(|| {
            ClientError::InvalidArgument(format!("not a slash command: {input:?}"))
        })?;

        let (word, rest) = match body.split_once(' ') {
            Some((word, rest)) => (word, rest.trim()),
            None => (body, ""),
        };
        let rest = (!rest.is_empty()).then_some(rest);

        let missing = |usage: &str| ClientError::InvalidArgument(format!("usage: {usage}"));

        let cmd = match word.to_ascii_lowercase().as_str() {
            "join" | "j" => {
                let channel = rest.and_then(first_word).ok_or_else(|| missing("/join <channel>"))?;
                SlashCommand::Join(channel.to_owned())
            }
            "part" | "leave" => {
                let rest = rest.ok_or_else(|| missing("/part <channel> [reason]"))?;
                let (channel, reason) = split_word(rest);
                SlashCommand::Part {
                    channel: channel.to_owned(),
                    reason: reason.map(str::to_owned),
                }
            }
            "msg" | "query" => {
                let rest = rest.ok_or_else(|| missing("/msg <target> <text>"))?;
                match split_word(rest) {
                    (target, Some(text)) => SlashCommand::Msg {
                        target: target.to_owned(),
                        text: text.to_owned(),
                    },
                    _ => return Err(missing("/msg <target> <text>")),
                }
            }
            "nick" => {
                let nick = rest.and_then(first_word).ok_or_else(|| missing("/nick <nick>"))?;
                SlashCommand::Nick(nick.to_owned())
            }
            "quit" | "exit" => SlashCommand::Quit(rest.map(str::to_owned)),
            "list" => SlashCommand::List,
            "help" => SlashCommand::Help,
            _ => SlashCommand::Unknown(word.to_owned()),
        };

        Ok(cmd)
    }
}

fn first_word(s: &str) -> Option<&str> {
    s.split_whitespace().next()
}

fn split_word(s: &str) -> (&str, Option<&str>) {
    match s.split_once(' ') {
        Some((word, rest)) => {
            let rest = rest.trim_start();
            (word, (!rest.is_empty()).then_some(rest))
        }
        None => (s, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(SlashCommand::parse("/nick bob").unwrap(), SlashCommand::Nick("bob".into()));
        assert_eq!(SlashCommand::parse("/QUIT").unwrap(), SlashCommand::Quit(None));
        assert_eq!(
            SlashCommand::parse("/quit see you").unwrap(),
            SlashCommand::Quit(Some("see you".into()))
        );
        assert_eq!(SlashCommand::parse("/list").unwrap(), SlashCommand::List);
        assert_eq!(SlashCommand::parse("/help").unwrap(), SlashCommand::Help);
        assert_eq!(SlashCommand::parse("/join rust").unwrap(), SlashCommand::Join("rust".into()));
    }

    #[test]
    fn test_parse_part_and_msg() {
        assert_eq!(
            SlashCommand::parse("/part #x going  away").unwrap(),
            SlashCommand::Part {
                channel: "#x".into(),
                reason: Some("going  away".into())
            }
        );
        assert_eq!(
            SlashCommand::parse("/msg alice hi there").unwrap(),
            SlashCommand::Msg {
                target: "alice".into(),
                text: "hi there".into()
            }
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            SlashCommand::parse("/frobnicate now").unwrap(),
            SlashCommand::Unknown("frobnicate".into())
        );
    }

    #[test]
    fn test_missing_arguments() {
        assert!(matches!(
            SlashCommand::parse("/nick"),
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(matches!(
            SlashCommand::parse("/msg alice"),
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(matches!(
            SlashCommand::parse("hello"),
            Err(ClientError::InvalidArgument(_))
        ));
    }
}
