//! Owned IRC message type.

use std::str::FromStr;

use crate::error::MessageParseError;
use crate::prefix::nick_from_prefix;

use super::nom_parser::RawParts;

/// One inbound IRC line, split into its components.
///
/// Produced by [`ParsedMessage::parse`]; the command is kept exactly as the
/// server sent it and should be compared case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedMessage {
    /// Origin of the message, without the leading `:`.
    pub prefix: Option<String>,
    /// Command word or three-digit numeric.
    pub command: String,
    /// Parameters in order; the trailing one has its `:` removed.
    pub params: Vec<String>,
    /// The line as received, without its CR/LF terminator.
    pub raw: String,
}

impl ParsedMessage {
    /// Parse a single IRC line.
    ///
    /// A trailing `\r\n` (or lone `\n`) is tolerated and stripped.
    ///
    /// # Errors
    ///
    /// Returns a [`MessageParseError`] when the line is empty, the prefix is
    /// not followed by a space, or the command is missing or malformed.
    ///
    /// # Example
    ///
    /// ```
    /// use slirc_client::ParsedMessage;
    ///
    /// let msg = ParsedMessage::parse(":nick!u@h PRIVMSG #test :Hello world\r\n").unwrap();
    /// assert_eq!(msg.prefix.as_deref(), Some("nick!u@h"));
    /// assert_eq!(msg.command, "PRIVMSG");
    /// assert_eq!(msg.params, vec!["#test", "Hello world"]);
    /// ```
    pub fn parse(line: &str) -> Result<Self, MessageParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let parts = RawParts::parse(line)?;

        Ok(ParsedMessage {
            prefix: parts.prefix.map(str::to_owned),
            command: parts.command.to_owned(),
            params: parts.params.into_iter().map(str::to_owned).collect(),
            raw: line.to_owned(),
        })
    }

    /// Get the parameter at `index`, if present.
    #[must_use]
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Nickname of the sender, or `"system"` for prefix-less lines.
    #[must_use]
    pub fn source_nick(&self) -> &str {
        nick_from_prefix(self.prefix.as_deref())
    }

    /// Whether the command is a three-digit numeric reply.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.numeric().is_some()
    }

    /// The numeric reply code, if the command is one.
    #[must_use]
    pub fn numeric(&self) -> Option<u16> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command.parse().ok()
        } else {
            None
        }
    }
}

impl FromStr for ParsedMessage {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParsedMessage::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_terminator() {
        let msg = ParsedMessage::parse("PING :server\r\n").unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params, vec!["server"]);
        assert_eq!(msg.raw, "PING :server");
    }

    #[test]
    fn test_source_nick() {
        let msg: ParsedMessage = ":alice!a@host JOIN #x".parse().unwrap();
        assert_eq!(msg.source_nick(), "alice");

        let msg: ParsedMessage = ":irc.example.com 001 me :Welcome".parse().unwrap();
        assert_eq!(msg.source_nick(), "irc.example.com");

        let msg: ParsedMessage = "PING :token".parse().unwrap();
        assert_eq!(msg.source_nick(), "system");
    }

    #[test]
    fn test_numeric() {
        let msg: ParsedMessage = ":s 353 me = #x :@alice".parse().unwrap();
        assert_eq!(msg.numeric(), Some(353));
        assert!(msg.is_numeric());

        let msg: ParsedMessage = "PRIVMSG #x :hi".parse().unwrap();
        assert_eq!(msg.numeric(), None);
    }

    #[test]
    fn test_param_access() {
        let msg: ParsedMessage = ":a!u@h PART #x :gone home".parse().unwrap();
        assert_eq!(msg.param(0), Some("#x"));
        assert_eq!(msg.param(1), Some("gone home"));
        assert_eq!(msg.param(2), None);
    }

    #[test]
    fn test_empty_line_is_malformed() {
        assert_eq!(
            ParsedMessage::parse("\r\n"),
            Err(MessageParseError::EmptyMessage)
        );
    }
}
