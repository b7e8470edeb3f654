//! Outbound IRC line encoding.
//!
//! This module provides the [`IrcEncode`] trait for writing commands
//! directly to byte buffers, plus [`format`], the inverse of
//! [`ParsedMessage::parse`](crate::ParsedMessage::parse) for the command
//! and parameters.
//!
//! # Example
//!
//! ```
//! use slirc_client::encode::IrcEncode;
//! use slirc_client::OutboundCommand;
//!
//! let cmd = OutboundCommand::privmsg("#channel", "Hello!");
//! let mut buf = Vec::new();
//! cmd.encode(&mut buf).unwrap();
//!
//! assert_eq!(&buf, b"PRIVMSG #channel :Hello!\r\n");
//! ```

use std::fmt;
use std::io::{self, Write};

mod command;

/// A trait for encoding IRC protocol elements directly to a byte stream.
pub trait IrcEncode {
    /// Encode this value, including the CRLF terminator, to the given writer.
    ///
    /// Returns the number of bytes written on success.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write fails.
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<usize>;

    /// Encode this value to a new `Vec<u8>`.
    #[must_use]
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(512); // IRC max line length
        let _ = self.encode(&mut buf);
        buf
    }
}

/// Check if a string needs colon-prefixing as the last IRC parameter.
///
/// Empty values are prefixed too, otherwise the parameter would vanish
/// on the wire.
#[inline]
pub(crate) fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.contains(':')
}

/// Write a command with parameters. The last parameter gets a `:` prefix
/// if it needs one or if `force_trailing` is set.
pub(crate) fn write_cmd<W: fmt::Write, S: AsRef<str>>(
    w: &mut W,
    cmd: &str,
    params: &[S],
    force_trailing: bool,
) -> fmt::Result {
    w.write_str(cmd)?;

    let Some((last, middle)) = params.split_last() else {
        return Ok(());
    };

    for param in middle {
        w.write_char(' ')?;
        w.write_str(param.as_ref())?;
    }

    w.write_char(' ')?;
    let last = last.as_ref();
    if force_trailing || needs_colon_prefix(last) {
        w.write_char(':')?;
    }
    w.write_str(last)
}

/// Format a command and its parameters as a wire line (without CRLF).
///
/// ```
/// use slirc_client::encode::format;
///
/// assert_eq!(format("JOIN", &["#test"]), "JOIN #test");
/// assert_eq!(format("PRIVMSG", &["#test", "Hello world"]), "PRIVMSG #test :Hello world");
/// assert_eq!(format("PING", &[] as &[&str]), "PING");
/// ```
#[must_use]
pub fn format<S: AsRef<str>>(command: &str, params: &[S]) -> String {
    let mut line = String::with_capacity(64);
    // Writing into a String cannot fail.
    let _ = write_cmd(&mut line, command, params, false);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ParsedMessage;

    #[test]
    fn test_needs_colon_prefix() {
        assert!(needs_colon_prefix(""));
        assert!(needs_colon_prefix("two words"));
        assert!(needs_colon_prefix(":leading"));
        assert!(needs_colon_prefix("a:b"));
        assert!(!needs_colon_prefix("#channel"));
    }

    #[test]
    fn test_format_inverts_parse() {
        for line in [
            "PING :irc.example.com",
            ":nick!u@h PRIVMSG #test :Hello world",
            ":s 353 me = #x :@alice +bob carol",
            "PRIVMSG #channel :",
            "PRIVMSG #channel ::-)",
            "MODE #c +o nick",
        ] {
            let parsed = ParsedMessage::parse(line).unwrap();
            let formatted = format(&parsed.command, &parsed.params);
            let reparsed = ParsedMessage::parse(&formatted).unwrap();
            assert_eq!(parsed.command, reparsed.command, "line: {line}");
            assert_eq!(parsed.params, reparsed.params, "line: {line}");
        }
    }

    #[test]
    fn test_forced_trailing() {
        let mut line = String::new();
        write_cmd(&mut line, "PONG", &["token"], true).unwrap();
        assert_eq!(line, "PONG :token");
    }
}
