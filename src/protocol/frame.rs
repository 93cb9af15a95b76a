//! Frame codec: one interface over both framing strategies.
//!
//! A frame is an opaque, already-encoded envelope. On the wire it is either
//! preceded by a 4-byte big-endian length ([`Framing::LengthPrefixed`]) or
//! written bare, relying on msgpack being self-delimiting
//! ([`Framing::SelfDelimiting`]).
//!
//! # Example
//!
//! ```
//! use custard_client::protocol::{FrameCodec, Framing};
//!
//! let codec = FrameCodec::new(Framing::LengthPrefixed);
//! let bytes = codec.encode(b"hello").unwrap();
//! assert_eq!(bytes.len(), 4 + 5); // prefix + payload
//! ```

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::frame_buffer::FrameBuffer;
use super::wire_format::{encode_length, DEFAULT_MAX_PAYLOAD_SIZE, LENGTH_PREFIX_SIZE};
use crate::error::Result;

/// Read chunk size for socket reads.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// How frames are delimited on the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// `[u32 BE length][payload]`.
    #[default]
    LengthPrefixed,
    /// Bare msgpack value; its encoding marks where it ends.
    SelfDelimiting,
}

/// Encodes and decodes frames for one framing strategy.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    framing: Framing,
    max_payload_size: u32,
}

impl FrameCodec {
    /// Create a codec with the default max payload (64 MiB).
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }

    /// Create a codec with a custom max payload size.
    pub fn with_max_payload(framing: Framing, max_payload_size: u32) -> Self {
        Self {
            framing,
            max_payload_size,
        }
    }

    /// The framing strategy in use.
    #[inline]
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Maximum payload size accepted in either direction.
    #[inline]
    pub fn max_payload_size(&self) -> u32 {
        self.max_payload_size
    }

    /// Build a complete frame as a single byte vector.
    ///
    /// # Errors
    ///
    /// Returns `OversizedPayload` if the payload is larger than the max
    /// payload size. No I/O has happened at that point.
    pub fn encode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        match self.framing {
            Framing::LengthPrefixed => {
                let prefix = encode_length(payload.len(), self.max_payload_size)?;
                let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
                buf.extend_from_slice(&prefix);
                buf.extend_from_slice(payload);
                Ok(buf)
            }
            Framing::SelfDelimiting => {
                // Same size rule, so both framings reject the same payloads.
                encode_length(payload.len(), self.max_payload_size)?;
                Ok(payload.to_vec())
            }
        }
    }

    /// A fresh frame buffer configured like this codec.
    pub fn buffer(&self) -> FrameBuffer {
        FrameBuffer::with_max_payload(self.framing, self.max_payload_size)
    }

    /// Encode `payload` and write it to `writer`, then flush.
    pub async fn write_frame<W>(&self, writer: &mut W, payload: &[u8]) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let frame = self.encode(payload)?;
        writer.write_all(&frame).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read the next complete frame from `reader`.
    ///
    /// `buffer` carries bytes read past the end of the previous frame, so
    /// a caller reading several frames from one stream passes the same
    /// buffer each time.
    ///
    /// Returns `Ok(None)` when the stream closes cleanly on a frame boundary.
    ///
    /// # Errors
    ///
    /// Returns `TruncatedFrame` if the stream closes mid-frame.
    pub async fn read_frame<R>(&self, reader: &mut R, buffer: &mut FrameBuffer) -> Result<Option<Bytes>>
    where
        R: AsyncRead + Unpin,
    {
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];

        loop {
            if let Some(frame) = buffer.next_frame()? {
                return Ok(Some(frame));
            }

            let n = reader.read(&mut chunk).await?;
            if n == 0 {
                buffer.finish()?;
                return Ok(None);
            }
            buffer.extend(&chunk[..n]);
        }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(Framing::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MsgPackCodec;
    use crate::error::ClientError;

    #[test]
    fn test_encode_length_prefixed() {
        let codec = FrameCodec::new(Framing::LengthPrefixed);
        let bytes = codec.encode(b"hello").unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 0, 5]);
        assert_eq!(&bytes[4..], b"hello");
    }

    #[test]
    fn test_encode_self_delimiting_is_bare() {
        let codec = FrameCodec::new(Framing::SelfDelimiting);
        let payload = MsgPackCodec::encode(&"bare").unwrap();
        assert_eq!(codec.encode(&payload).unwrap(), payload);
    }

    #[test]
    fn test_encode_oversized() {
        let codec = FrameCodec::with_max_payload(Framing::LengthPrefixed, 3);
        let result = codec.encode(b"four");
        assert!(matches!(
            result,
            Err(ClientError::OversizedPayload { size: 4, max: 3 })
        ));
    }

    #[tokio::test]
    async fn test_write_then_read_frame() {
        let codec = FrameCodec::default();
        let (mut client, mut server) = tokio::io::duplex(64);

        codec.write_frame(&mut client, b"ping").await.unwrap();
        drop(client);

        let mut buffer = codec.buffer();
        let frame = codec.read_frame(&mut server, &mut buffer).await.unwrap();
        assert_eq!(frame.as_deref(), Some(&b"ping"[..]));

        let end = codec.read_frame(&mut server, &mut buffer).await.unwrap();
        assert!(end.is_none());
    }

    #[tokio::test]
    async fn test_read_frame_truncated() {
        use tokio::io::AsyncWriteExt;

        let codec = FrameCodec::default();
        let (mut client, mut server) = tokio::io::duplex(64);

        client.write_all(&[0, 0, 0, 8, b'a', b'b']).await.unwrap();
        drop(client);

        let mut buffer = codec.buffer();
        let result = codec.read_frame(&mut server, &mut buffer).await;
        assert!(matches!(
            result,
            Err(ClientError::TruncatedFrame {
                expected: 8,
                received: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_read_self_delimited_frames_back_to_back() {
        let codec = FrameCodec::new(Framing::SelfDelimiting);
        let (mut client, mut server) = tokio::io::duplex(256);

        let first = MsgPackCodec::encode(&vec![1u8, 2, 3]).unwrap();
        let second = MsgPackCodec::encode(&"second").unwrap();
        codec.write_frame(&mut client, &first).await.unwrap();
        codec.write_frame(&mut client, &second).await.unwrap();
        drop(client);

        let mut buffer = codec.buffer();
        let a = codec.read_frame(&mut server, &mut buffer).await.unwrap().unwrap();
        let b = codec.read_frame(&mut server, &mut buffer).await.unwrap().unwrap();
        assert_eq!(&a[..], &first[..]);
        assert_eq!(&b[..], &second[..]);
    }
}
