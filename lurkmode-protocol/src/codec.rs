//! Line codec for IRC framing

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::irc::{IrcMessage, ParseError};

/// Maximum line length (Twitch allows 8 KiB of tags plus a 512 byte body)
pub const MAX_LINE_LENGTH: usize = 16 * 1024;

/// Protocol codec error
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line too long: {size} bytes (max {max})")]
    LineTooLong { size: usize, max: usize },
}

/// Codec that decodes CRLF terminated lines into [`IrcMessage`]s and encodes
/// outgoing messages the same way. Blank and malformed lines are skipped.
#[derive(Debug)]
pub struct IrcCodec {
    max_length: usize,
    /// Bytes already scanned for a newline in the current buffer
    next_index: usize,
}

impl IrcCodec {
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
        }
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcCodec {
    type Item = IrcMessage;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let newline = src[self.next_index..].iter().position(|b| *b == b'\n');
            let Some(offset) = newline else {
                if src.len() > self.max_length {
                    return Err(CodecError::LineTooLong {
                        size: src.len(),
                        max: self.max_length,
                    });
                }
                self.next_index = src.len();
                return Ok(None);
            };

            let line_end = self.next_index + offset;
            self.next_index = 0;

            let line = src.split_to(line_end + 1);
            if line_end > self.max_length {
                return Err(CodecError::LineTooLong {
                    size: line_end,
                    max: self.max_length,
                });
            }

            let text = String::from_utf8_lossy(&line);
            match IrcMessage::parse(&text) {
                Ok(msg) => return Ok(Some(msg)),
                Err(ParseError::Empty) => continue,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed line");
                    continue;
                }
            }
        }
    }
}

impl Encoder<IrcMessage> for IrcCodec {
    type Error = CodecError;

    fn encode(&mut self, item: IrcMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let line = item.to_string();
        if line.len() + 2 > self.max_length {
            return Err(CodecError::LineTooLong {
                size: line.len() + 2,
                max: self.max_length,
            });
        }

        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
