//! Line-based codec for tokio.
//!
//! This module provides a codec that reads and writes newline-terminated
//! lines. Received bytes are decoded as UTF-8 best-effort: undecodable
//! sequences are replaced rather than failing the connection, matching the
//! engine's fire-and-forget framing policy. No line length limit is
//! enforced at this layer.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Codec that frames the byte stream into newline-terminated lines.
///
/// Decoded lines are yielded with trailing `\r`/`\n` stripped.
#[derive(Debug, Default)]
pub struct LineCodec {
    /// Index of next byte to check for a newline.
    next_index: usize,
}

impl LineCodec {
    /// Create a new line codec.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            let text = String::from_utf8_lossy(&line);
            Ok(Some(text.trim_end_matches(['\r', '\n']).to_string()))
        } else {
            // No complete line yet. Remember where we stopped so the
            // scanned span is not revisited on the next call.
            self.next_index = src.len();
            Ok(None)
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend_from_slice(msg.as_bytes());
        Ok(())
    }
}
