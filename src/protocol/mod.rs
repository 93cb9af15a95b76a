//! Protocol module - framing of envelopes on the byte stream.
//!
//! This module implements the frame codec:
//! - 4-byte big-endian length prefix encoding/decoding
//! - Frame buffer for accumulating partial reads
//! - Framing strategy selection (length-prefixed or self-delimiting)

mod frame;
mod frame_buffer;
mod value_scanner;
mod wire_format;

pub use frame::{FrameCodec, Framing};
pub use frame_buffer::FrameBuffer;
pub use wire_format::{
    decode_length, encode_length, ABSOLUTE_MAX_PAYLOAD_SIZE, DEFAULT_MAX_PAYLOAD_SIZE,
    LENGTH_PREFIX_SIZE,
};
