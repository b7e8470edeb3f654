//! Line framing for IRC over a byte stream.
//!
//! [`IrcCodec`] keeps incomplete fragments in the read buffer between reads
//! and only yields a line once its `\n` terminator has arrived, so a message
//! split across TCP segments is still delivered exactly once.

use bytes::{Buf, BufMut, BytesMut};
use encoding::{Encoding, UTF_8};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{trace, warn};

use crate::command::OutboundCommand;
use crate::error::{ClientError, Result};
use crate::transport::MAX_IRC_LINE_LEN;

/// Codec turning a byte stream into decoded IRC lines and
/// [`OutboundCommand`]s into CRLF-terminated bytes.
#[derive(Debug, Clone)]
pub struct IrcCodec {
    encoding: &'static Encoding,
    max_line_len: usize,
    /// Bytes of the buffer already searched for a terminator.
    next_index: usize,
    /// Dropping an over-long line until its terminator shows up.
    discarding: bool,
}

impl IrcCodec {
    /// Create a codec for the encoding named by `label` (e.g. `"utf-8"`,
    /// `"latin1"`).
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidArgument`] if the label is unknown.
    pub fn new(label: &str) -> Result<IrcCodec> {
        let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
            ClientError::InvalidArgument(format!("unknown encoding: {label:?}"))
        })?;
        Ok(IrcCodec::with_encoding(encoding))
    }

    /// Create a codec for a known encoding.
    #[must_use]
    pub fn with_encoding(encoding: &'static Encoding) -> IrcCodec {
        IrcCodec {
            encoding,
            max_line_len: MAX_IRC_LINE_LEN,
            next_index: 0,
            discarding: false,
        }
    }

    /// Override the maximum inbound line length, terminator excluded.
    #[must_use]
    pub fn with_max_line_len(mut self, max_line_len: usize) -> IrcCodec {
        self.max_line_len = max_line_len;
        self
    }

    /// The encoding in use.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    fn decode_line(&self, bytes: &[u8]) -> String {
        let (text, had_errors) = self.encoding.decode_without_bom_handling(bytes);
        if had_errors {
            trace!(encoding = self.encoding.name(), "replaced undecodable bytes");
        }
        text.into_owned()
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        IrcCodec::with_encoding(UTF_8)
    }
}

impl Decoder for IrcCodec {
    type Item = String;
    type Error = ClientError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        loop {
            let newline = src[self.next_index..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| self.next_index + offset);

            let Some(pos) = newline else {
                if self.discarding {
                    src.clear();
                    self.next_index = 0;
                } else if src.len() > self.max_line_len {
                    warn!(
                        len = src.len(),
                        limit = self.max_line_len,
                        "inbound line too long, discarding"
                    );
                    src.clear();
                    self.next_index = 0;
                    self.discarding = true;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let frame = src.split_to(pos + 1);
            self.next_index = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }

            let mut line = &frame[..frame.len() - 1];
            if let [rest @ .., b'\r'] = line {
                line = rest;
            }

            if line.len() > self.max_line_len {
                warn!(
                    len = line.len(),
                    limit = self.max_line_len,
                    "inbound line too long, discarding"
                );
                continue;
            }

            let text = self.decode_line(line);
            if text.trim().is_empty() {
                continue;
            }
            return Ok(Some(text));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if !src.is_empty() {
            if !self.discarding {
                warn!(len = src.len(), "discarding partial line at end of stream");
            }
            src.advance(src.len());
        }
        self.next_index = 0;
        self.discarding = false;
        Ok(None)
    }
}

impl Encoder<OutboundCommand> for IrcCodec {
    type Error = ClientError;

    fn encode(&mut self, cmd: OutboundCommand, dst: &mut BytesMut) -> Result<()> {
        let line = cmd.to_wire_line();
        let (bytes, _, unmappable) = self.encoding.encode(&line);
        if unmappable {
            warn!(
                encoding = self.encoding.name(),
                command = %cmd.command,
                "outbound text has characters the encoding cannot represent"
            );
        }
        dst.reserve(bytes.len() + 2);
        dst.put_slice(&bytes);
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut IrcCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = codec.decode(buf).unwrap() {
            out.push(line);
        }
        out
    }

    #[test]
    fn test_fragmented_frame() {
        let mut codec = IrcCodec::default();
        let mut buf = BytesMut::from("PRIV");
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"MSG #a :hi\r\n");
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["PRIVMSG #a :hi"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_multiple_lines_and_bare_lf() {
        let mut codec = IrcCodec::default();
        let mut buf = BytesMut::from("PING :a\r\n\r\nPING :b\nPI");
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["PING :a", "PING :b"]);
        assert_eq!(&buf[..], b"PI");
    }

    #[test]
    fn test_overlong_line_is_skipped() {
        let mut codec = IrcCodec::default().with_max_line_len(16);
        let mut buf = BytesMut::from(&b"PRIVMSG #a :this is far too long"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());

        buf.extend_from_slice(b" still going\r\nPING :ok\r\n");
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["PING :ok"]);
    }

    #[test]
    fn test_partial_line_at_eof_is_dropped() {
        let mut codec = IrcCodec::default();
        let mut buf = BytesMut::from("PING :x\r\nPART");
        assert_eq!(codec.decode_eof(&mut buf).unwrap().as_deref(), Some("PING :x"));
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_latin1_round_trip() {
        let mut codec = IrcCodec::new("latin1").unwrap();
        let mut buf = BytesMut::new();
        codec
            .encode(OutboundCommand::privmsg("#a", "café"), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"PRIVMSG #a :caf\xe9\r\n");

        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("PRIVMSG #a :café"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut codec = IrcCodec::default();
        let mut buf = BytesMut::from(&b"PRIVMSG #a :\xff\r\n"[..]);
        assert_eq!(
            codec.decode(&mut buf).unwrap().as_deref(),
            Some("PRIVMSG #a :\u{fffd}")
        );
    }

    #[test]
    fn test_unknown_encoding() {
        assert!(matches!(
            IrcCodec::new("klingon"),
            Err(ClientError::InvalidArgument(_))
        ));
    }
}
