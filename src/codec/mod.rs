//! Codec module - serialization of envelopes and their payloads.
//!
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde` (`to_vec_named`, structs as maps)
//! - [`RawEnvelope`] / [`Response`] - the `{tag, value}` wrapper with two-phase decoding
//!
//! # Design
//!
//! Codecs are marker structs and free functions rather than trait objects, so
//! the payload type is chosen at compile time once the tag is known.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use custard_client::codec::{MsgPackCodec, Response};
//!
//! let encoded = MsgPackCodec::encode(&"hello").unwrap();
//! let decoded: String = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, "hello");
//!
//! let bytes = Bytes::from_static(Response::internal_server_error_bytes());
//! assert_eq!(Response::decode(bytes).unwrap(), Response::InternalServerError);
//! ```

mod envelope;
mod msgpack;

pub use envelope::{
    encode_envelope, RawEnvelope, Response, INTERNAL_SERVER_ERROR_ENVELOPE,
    TAG_INTERNAL_SERVER_ERROR, TAG_OK,
};
pub use msgpack::MsgPackCodec;
