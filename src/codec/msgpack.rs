//! MsgPack codec using `rmp-serde`.
//!
//! **Always use `to_vec_named`, never `to_vec`.** Peers decode structs as
//! maps keyed by field name; `to_vec` would emit positional arrays that no
//! other client of the socket understands.
//!
//! # Example
//!
//! ```
//! use custard_client::codec::MsgPackCodec;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Collate {
//!     key: String,
//! }
//!
//! let msg = Collate { key: "tags".to_string() };
//! let encoded = MsgPackCodec::encode(&msg).unwrap();
//! let decoded: Collate = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, msg);
//! ```

use std::io::Cursor;

use serde::de::{Deserializer as _, IgnoredAny};

use crate::error::Result;

/// msgpack `nil` marker.
pub(crate) const NIL_MARKER: u8 = 0xc0;

/// MessagePack codec for structured data.
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes, structs as maps.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    /// Decode MsgPack bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be deserialized to type T.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    /// Advance `cursor` past exactly one msgpack value.
    pub(crate) fn skip_value(
        cursor: &mut Cursor<&[u8]>,
    ) -> std::result::Result<(), rmp_serde::decode::Error> {
        let mut de = rmp_serde::Deserializer::new(cursor);
        (&mut de).deserialize_any(IgnoredAny)?;
        Ok(())
    }
}
