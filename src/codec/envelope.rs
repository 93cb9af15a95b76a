//! Tagged envelope `{tag, value}` around every request and response.
//!
//! Encoding is direct: the operation payload is serialized as the `value`
//! field next to its tag. Decoding happens in two phases. [`RawEnvelope`]
//! splits the map into the tag and the still-encoded bytes of `value`, and
//! only once the tag is known does the caller pick the type to decode
//! `value` into.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use custard_client::codec::{encode_envelope, RawEnvelope};
//!
//! let bytes = encode_envelope("Ok", Some(&vec!["code", "music"])).unwrap();
//! let raw = RawEnvelope::decode(Bytes::from(bytes)).unwrap();
//! assert_eq!(raw.tag, "Ok");
//! let values: Vec<String> = raw.decode_value().unwrap().unwrap();
//! assert_eq!(values, ["code", "music"]);
//! ```

use std::io::Cursor;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::msgpack::{MsgPackCodec, NIL_MARKER};
use crate::error::{ClientError, Result};

/// Response tag for a successful call.
pub const TAG_OK: &str = "Ok";

/// Response tag for an opaque server-side failure.
pub const TAG_INTERNAL_SERVER_ERROR: &str = "InternalServerError";

/// `{tag: "InternalServerError"}`, pre-encoded so failure replies need no
/// serializer.
pub const INTERNAL_SERVER_ERROR_ENVELOPE: &[u8] = &[
    0x81, // fixmap, 1 entry
    0xa3, b't', b'a', b'g', // fixstr "tag"
    0xb3, // fixstr, 19 bytes
    b'I', b'n', b't', b'e', b'r', b'n', b'a', b'l', b'S', b'e', b'r', b'v', b'e', b'r', b'E',
    b'r', b'r', b'o', b'r',
];

#[derive(Serialize)]
struct EnvelopeRef<'a, T: ?Sized> {
    tag: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a T>,
}

/// Encode `{tag, value}` as a msgpack map.
///
/// `value: None` omits the `value` key entirely.
pub fn encode_envelope<T: Serialize + ?Sized>(tag: &str, value: Option<&T>) -> Result<Vec<u8>> {
    MsgPackCodec::encode(&EnvelopeRef { tag, value })
}

/// An envelope whose `value` has not been decoded yet.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEnvelope {
    /// Operation or result tag.
    pub tag: String,
    /// Raw msgpack bytes of `value`; `None` when absent or nil.
    pub value: Option<Bytes>,
}

impl RawEnvelope {
    /// Phase one: split an encoded envelope into tag and raw value.
    ///
    /// Unknown keys are skipped. The `value` bytes are a zero-copy slice of
    /// `bytes`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedEnvelope` if the bytes are not a map with a string
    /// `tag`, or carry trailing data after the map.
    pub fn decode(bytes: Bytes) -> Result<Self> {
        let mut cursor = Cursor::new(&bytes[..]);
        let entries = rmp::decode::read_map_len(&mut cursor)
            .map_err(|e| ClientError::MalformedEnvelope(format!("expected a map: {e}")))?;

        let mut tag = None;
        let mut value = None;

        for _ in 0..entries {
            let key = {
                let mut de = rmp_serde::Deserializer::new(&mut cursor);
                String::deserialize(&mut de)
                    .map_err(|e| ClientError::MalformedEnvelope(format!("bad key: {e}")))?
            };

            let start = cursor.position() as usize;
            MsgPackCodec::skip_value(&mut cursor)
                .map_err(|e| ClientError::MalformedEnvelope(format!("bad `{key}` entry: {e}")))?;
            let end = cursor.position() as usize;

            match key.as_str() {
                "tag" => {
                    let decoded: String = MsgPackCodec::decode(&bytes[start..end]).map_err(|_| {
                        ClientError::MalformedEnvelope("`tag` is not a string".to_string())
                    })?;
                    tag = Some(decoded);
                }
                "value" if bytes[start] != NIL_MARKER => value = Some(bytes.slice(start..end)),
                "value" => value = None,
                _ => {}
            }
        }

        if (cursor.position() as usize) != bytes.len() {
            return Err(ClientError::MalformedEnvelope(format!(
                "{} trailing bytes after envelope",
                bytes.len() - cursor.position() as usize
            )));
        }

        let tag = tag.ok_or_else(|| ClientError::MalformedEnvelope("missing `tag`".to_string()))?;

        Ok(Self { tag, value })
    }

    /// Phase two: decode `value` as `T`.
    ///
    /// Returns `Ok(None)` when the envelope carried no value.
    ///
    /// # Errors
    ///
    /// Returns `MsgPackDecode` if the value does not have the shape of `T`.
    pub fn decode_value<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.value
            .as_deref()
            .map(MsgPackCodec::decode::<T>)
            .transpose()
    }
}

/// A response envelope after its tag has been checked.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// `Ok`, with the raw result value (absent for "not found").
    Ok(Option<Bytes>),
    /// `InternalServerError`; any value is ignored.
    InternalServerError,
}

impl Response {
    /// Decode a response envelope and check its tag.
    ///
    /// # Errors
    ///
    /// Returns `UnrecognizedTag` for any tag other than `Ok` and
    /// `InternalServerError`, or a decoding error for malformed bytes.
    pub fn decode(bytes: Bytes) -> Result<Self> {
        Self::try_from(RawEnvelope::decode(bytes)?)
    }

    /// Encode `Ok` with a value.
    pub fn encode_ok<T: Serialize + ?Sized>(value: Option<&T>) -> Result<Vec<u8>> {
        encode_envelope(TAG_OK, value)
    }

    /// Encoded `InternalServerError` envelope (no value).
    pub fn internal_server_error_bytes() -> &'static [u8] {
        INTERNAL_SERVER_ERROR_ENVELOPE
    }

    /// Raw `Ok` value, or the server failure as an error.
    pub fn into_result(self) -> Result<Option<Bytes>> {
        match self {
            Response::Ok(value) => Ok(value),
            Response::InternalServerError => Err(ClientError::InternalServerError),
        }
    }
}

impl TryFrom<RawEnvelope> for Response {
    type Error = ClientError;

    fn try_from(raw: RawEnvelope) -> Result<Self> {
        match raw.tag.as_str() {
            TAG_OK => Ok(Response::Ok(raw.value)),
            TAG_INTERNAL_SERVER_ERROR => Ok(Response::InternalServerError),
            _ => Err(ClientError::UnrecognizedTag(raw.tag)),
        }
    }
}
