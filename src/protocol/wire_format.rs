//! Wire format of the length prefix.
//!
//! Length-prefixed frames carry a 4-byte header:
//! ```text
//! ┌──────────┬─────────────────────┐
//! │ Length   │ Envelope            │
//! │ 4 bytes  │ `Length` bytes      │
//! │ uint32 BE│ msgpack map         │
//! └──────────┴─────────────────────┘
//! ```
//!
//! Self-delimiting frames omit the header; the msgpack encoding of the
//! envelope marks its own end.

use crate::error::{ClientError, Result};

/// Length prefix size in bytes (fixed, exactly 4).
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default maximum payload size (64 MiB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: u32 = 64 * 1024 * 1024;

/// Absolute maximum payload size, the largest length a u32 prefix can carry.
pub const ABSOLUTE_MAX_PAYLOAD_SIZE: u32 = u32::MAX;

/// Encode a payload length as a big-endian prefix.
///
/// # Errors
///
/// Returns `OversizedPayload` if `len` exceeds `max_payload_size`.
///
/// # Example
///
/// ```
/// use custard_client::protocol::{encode_length, DEFAULT_MAX_PAYLOAD_SIZE};
///
/// let prefix = encode_length(258, DEFAULT_MAX_PAYLOAD_SIZE).unwrap();
/// assert_eq!(prefix, [0, 0, 1, 2]);
/// ```
pub fn encode_length(len: usize, max_payload_size: u32) -> Result<[u8; LENGTH_PREFIX_SIZE]> {
    let len32 = u32::try_from(len).map_err(|_| ClientError::OversizedPayload {
        size: len,
        max: max_payload_size as usize,
    })?;
    if len32 > max_payload_size {
        return Err(ClientError::OversizedPayload {
            size: len,
            max: max_payload_size as usize,
        });
    }
    Ok(len32.to_be_bytes())
}

/// Decode a big-endian length prefix.
///
/// Returns `None` if buffer is too short.
pub fn decode_length(buf: &[u8]) -> Option<u32> {
    if buf.len() < LENGTH_PREFIX_SIZE {
        return None;
    }
    Some(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]))
}
