//! Encoding for [`OutboundCommand`].

use std::fmt;
use std::io::{self, Write};

use tracing::warn;

use crate::command::OutboundCommand;
use crate::util::{truncate_utf8_safe, MAX_MESSAGE_BODY};

use super::{write_cmd, IrcEncode};

impl fmt::Display for OutboundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_cmd(f, &self.command, &self.params, self.trailing)
    }
}

impl OutboundCommand {
    /// The line as it goes on the wire (without CRLF), cut to the IRC
    /// body limit on a UTF-8 boundary.
    #[must_use]
    pub fn to_wire_line(&self) -> String {
        let line = self.to_string();
        if line.len() <= MAX_MESSAGE_BODY {
            return line;
        }

        warn!(
            command = %self.command,
            len = line.len(),
            limit = MAX_MESSAGE_BODY,
            "outbound line too long, truncating"
        );
        truncate_utf8_safe(&line, MAX_MESSAGE_BODY).to_owned()
    }
}

impl IrcEncode for OutboundCommand {
    fn encode<W: Write>(&self, w: &mut W) -> io::Result<usize> {
        let line = self.to_wire_line();
        w.write_all(line.as_bytes())?;
        w.write_all(b"\r\n")?;
        Ok(line.len() + 2)
    }
}
