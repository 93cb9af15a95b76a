//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! For length-prefixed framing it runs a small state machine:
//! - `WaitingForHeader`: Need at least 4 bytes
//! - `WaitingForPayload`: Length parsed, need N more payload bytes
//!
//! For self-delimiting framing a resumable scanner walks the msgpack value at
//! the front of the buffer. Progress is kept across pushes, so a large value
//! arriving in small reads is scanned once.
//!
//! # Example
//!
//! ```
//! use custard_client::protocol::{FrameBuffer, Framing};
//!
//! let mut buffer = FrameBuffer::new(Framing::LengthPrefixed);
//!
//! // Data arrives in chunks from socket
//! assert!(buffer.push(&[0, 0, 0, 2, 0xc3]).unwrap().is_empty());
//! let frames = buffer.push(&[0xc2]).unwrap();
//! assert_eq!(&frames[0][..], &[0xc3, 0xc2]);
//! ```

use bytes::{Bytes, BytesMut};

use super::frame::Framing;
use super::value_scanner::ValueScanner;
use super::wire_format::{decode_length, DEFAULT_MAX_PAYLOAD_SIZE, LENGTH_PREFIX_SIZE};
use crate::error::{ClientError, Result};

/// State machine for length-prefixed parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Waiting for complete length prefix (need 4 bytes).
    WaitingForHeader,
    /// Length parsed, waiting for payload bytes.
    WaitingForPayload { remaining: u32 },
}

/// Buffer for accumulating incoming bytes and extracting complete frames.
pub struct FrameBuffer {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
    /// Current parsing state (length-prefixed only).
    state: State,
    framing: Framing,
    /// Boundary scan of the pending value (self-delimiting only).
    scanner: ValueScanner,
    /// Maximum allowed payload size.
    max_payload_size: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer with default settings.
    ///
    /// Default capacity: 8KB, max payload: 64 MiB.
    pub fn new(framing: Framing) -> Self {
        Self::with_max_payload(framing, DEFAULT_MAX_PAYLOAD_SIZE)
    }

    /// Create a new frame buffer with custom max payload size.
    pub fn with_max_payload(framing: Framing, max_payload_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8 * 1024),
            state: State::WaitingForHeader,
            framing,
            scanner: ValueScanner::default(),
            max_payload_size,
        }
    }

    /// Push data into the buffer and extract all complete frames.
    ///
    /// Partial data is kept for the next push.
    ///
    /// # Errors
    ///
    /// Returns error if a payload exceeds max_payload_size or the buffered
    /// bytes cannot start a msgpack value.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Bytes>> {
        self.extend(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }

        Ok(frames)
    }

    /// Append data to the buffer without extracting frames.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to extract a single frame from the buffer.
    ///
    /// Returns:
    /// - `Ok(Some(frame))` if a complete frame was extracted
    /// - `Ok(None)` if more data is needed
    /// - `Err(...)` on a framing violation
    pub fn next_frame(&mut self) -> Result<Option<Bytes>> {
        match self.framing {
            Framing::LengthPrefixed => self.next_prefixed(),
            Framing::SelfDelimiting => self.next_self_delimited(),
        }
    }

    fn next_prefixed(&mut self) -> Result<Option<Bytes>> {
        loop {
            match self.state {
                State::WaitingForHeader => {
                    let Some(length) = decode_length(&self.buffer) else {
                        return Ok(None);
                    };

                    if length > self.max_payload_size {
                        return Err(ClientError::OversizedPayload {
                            size: length as usize,
                            max: self.max_payload_size as usize,
                        });
                    }

                    let _ = self.buffer.split_to(LENGTH_PREFIX_SIZE);
                    self.state = State::WaitingForPayload { remaining: length };
                }
                State::WaitingForPayload { remaining } => {
                    let remaining = remaining as usize;
                    if self.buffer.len() < remaining {
                        return Ok(None);
                    }

                    let payload = self.buffer.split_to(remaining).freeze();
                    self.state = State::WaitingForHeader;
                    return Ok(Some(payload));
                }
            }
        }
    }

    fn next_self_delimited(&mut self) -> Result<Option<Bytes>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let len = self.scanner.scan(&self.buffer, self.max_payload_size as usize)?;
        Ok(len.map(|len| self.buffer.split_to(len).freeze()))
    }

    /// Called when the stream reached EOF.
    ///
    /// Returns `Ok(())` when nothing is buffered, i.e. the stream ended on a
    /// frame boundary.
    ///
    /// # Errors
    ///
    /// Returns `TruncatedFrame` if a partial frame is buffered.
    pub fn finish(&self) -> Result<()> {
        match (self.framing, self.state) {
            (_, State::WaitingForHeader) if self.buffer.is_empty() => Ok(()),
            (Framing::LengthPrefixed, State::WaitingForHeader) => {
                Err(ClientError::TruncatedFrame {
                    expected: LENGTH_PREFIX_SIZE,
                    received: self.buffer.len(),
                })
            }
            (Framing::LengthPrefixed, State::WaitingForPayload { remaining }) => {
                Err(ClientError::TruncatedFrame {
                    expected: remaining as usize,
                    received: self.buffer.len(),
                })
            }
            (Framing::SelfDelimiting, _) => Err(ClientError::TruncatedFrame {
                expected: self.buffer.len() + 1,
                received: self.buffer.len(),
            }),
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
        self.scanner.reset();
    }
}
