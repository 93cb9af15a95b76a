//! Operation set - the six request shapes and their results.
//!
//! Requests are the cross product of {Single, List, Collate} × {Get, Query}.
//! `Get` forms address the whole document set; `Query` forms carry a
//! [`Query`](crate::query::Query) that filters it first.
//!
//! Every request type implements [`Operation`], which ties it to its
//! envelope tag and its result decoder. [`Client::call`](crate::Client::call)
//! is generic over `Operation`, so all six share one send/receive path.
//!
//! | Tag            | Request          | Output                  |
//! |----------------|------------------|-------------------------|
//! | `SingleGet`    | [`SingleGet`]    | `Option<SingleResult>`  |
//! | `SingleQuery`  | [`SingleQuery`]  | `Option<SingleResult>`  |
//! | `ListGet`      | [`ListGet`]      | [`ListResult`]          |
//! | `ListQuery`    | [`ListQuery`]    | [`ListResult`]          |
//! | `CollateGet`   | [`CollateGet`]   | `Vec<String>`           |
//! | `CollateQuery` | [`CollateQuery`] | `Vec<String>`           |

mod collate;
mod list;
mod single;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{encode_envelope, RawEnvelope};
use crate::error::{ClientError, Result};

pub use collate::{CollateGet, CollateQuery};
pub use list::{ListGet, ListQuery, ListResult};
pub use single::{SingleGet, SingleQuery, SingleResult};

/// A request that can be sent through [`Client::call`](crate::Client::call).
pub trait Operation: Serialize + DeserializeOwned {
    /// Envelope tag naming this operation on the wire.
    const TAG: &'static str;

    /// Decoded result type.
    type Output;

    /// Decode the raw `value` of an `Ok` response.
    ///
    /// # Errors
    ///
    /// Returns a decoding error if the value has the wrong shape, or is
    /// missing where this operation requires one.
    fn decode_output(value: Option<Bytes>) -> Result<Self::Output>;

    /// Encode this request as a `{tag, value}` envelope.
    fn encode_request(&self) -> Result<Vec<u8>> {
        encode_envelope(Self::TAG, Some(self))
    }
}

/// Decode a value that must be present.
pub(crate) fn decode_required<T: DeserializeOwned>(tag: &str, value: Option<Bytes>) -> Result<T> {
    let value = value.ok_or_else(|| {
        ClientError::MalformedEnvelope(format!("`Ok` response to {tag} carried no value"))
    })?;
    crate::codec::MsgPackCodec::decode(&value)
}

/// Any of the six requests, as seen by the receiving side.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    SingleGet(SingleGet),
    SingleQuery(SingleQuery),
    ListGet(ListGet),
    ListQuery(ListQuery),
    CollateGet(CollateGet),
    CollateQuery(CollateQuery),
}

impl Request {
    /// Envelope tag of the wrapped request.
    pub fn tag(&self) -> &'static str {
        match self {
            Request::SingleGet(_) => SingleGet::TAG,
            Request::SingleQuery(_) => SingleQuery::TAG,
            Request::ListGet(_) => ListGet::TAG,
            Request::ListQuery(_) => ListQuery::TAG,
            Request::CollateGet(_) => CollateGet::TAG,
            Request::CollateQuery(_) => CollateQuery::TAG,
        }
    }

    /// Encode as a `{tag, value}` envelope.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Request::SingleGet(req) => req.encode_request(),
            Request::SingleQuery(req) => req.encode_request(),
            Request::ListGet(req) => req.encode_request(),
            Request::ListQuery(req) => req.encode_request(),
            Request::CollateGet(req) => req.encode_request(),
            Request::CollateQuery(req) => req.encode_request(),
        }
    }

    /// Decode a request envelope: tag first, then the matching payload.
    ///
    /// # Errors
    ///
    /// Returns `UnrecognizedTag` for unknown tags and a decoding error for
    /// malformed payloads.
    pub fn decode(bytes: Bytes) -> Result<Self> {
        let raw = RawEnvelope::decode(bytes)?;
        let request = match raw.tag.as_str() {
            SingleGet::TAG => Request::SingleGet(payload(&raw)?),
            SingleQuery::TAG => Request::SingleQuery(payload(&raw)?),
            ListGet::TAG => Request::ListGet(payload(&raw)?),
            ListQuery::TAG => Request::ListQuery(payload(&raw)?),
            CollateGet::TAG => Request::CollateGet(payload(&raw)?),
            CollateQuery::TAG => Request::CollateQuery(payload(&raw)?),
            _ => return Err(ClientError::UnrecognizedTag(raw.tag)),
        };
        Ok(request)
    }
}

fn payload<T: DeserializeOwned>(raw: &RawEnvelope) -> Result<T> {
    raw.decode_value()?.ok_or_else(|| {
        ClientError::MalformedEnvelope(format!("{} request carried no value", raw.tag))
    })
}

macro_rules! impl_from_request {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Request {
                fn from(req: $variant) -> Self {
                    Request::$variant(req)
                }
            }
        )*
    };
}

impl_from_request!(SingleGet, SingleQuery, ListGet, ListQuery, CollateGet, CollateQuery);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MsgPackCodec;
    use crate::query::Query;

    fn loopback(request: Request) -> Request {
        let bytes = request.encode().unwrap();
        Request::decode(Bytes::from(bytes)).unwrap()
    }

    fn tags_query() -> Query {
        Query::builder()
            .field("tags", ["code", "music"])
            .field("listed", [true])
            .intersect(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_loopback_reproduces_every_shape() {
        let requests: Vec<Request> = vec![
            SingleGet::new("chai-cheese.md").sort_key("title").order_desc(true).into(),
            SingleGet::new("about.md").with_query(tags_query()).into(),
            ListGet::new().sort_key("created").offset(10).limit(3).into(),
            ListGet::new().order_desc(true).with_query(tags_query()).into(),
            CollateGet::new("tags").into(),
            CollateGet::new("tags").with_query(tags_query()).into(),
        ];

        for request in requests {
            assert_eq!(loopback(request.clone()), request, "{}", request.tag());
        }
    }

    #[test]
    fn test_envelope_uses_snake_case_fields() {
        let bytes = ListGet::new().sort_key("title").offset(2).limit(5).encode_request().unwrap();
        let raw = RawEnvelope::decode(Bytes::from(bytes)).unwrap();
        assert_eq!(raw.tag, "ListGet");

        let fields: std::collections::BTreeMap<String, serde_json::Value> =
            MsgPackCodec::decode(raw.value.as_deref().unwrap()).unwrap();
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["limit", "offset", "order_desc", "sort_key"]);
    }

    #[test]
    fn test_query_envelope_carries_flat_map_and_intersect() {
        let bytes = ListGet::new().limit(100).with_query(tags_query()).encode_request().unwrap();
        let raw = RawEnvelope::decode(Bytes::from(bytes)).unwrap();
        assert_eq!(raw.tag, "ListQuery");

        let fields: std::collections::BTreeMap<String, serde_json::Value> =
            MsgPackCodec::decode(raw.value.as_deref().unwrap()).unwrap();
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["intersect", "limit", "order_desc", "query"]);
        assert_eq!(fields["intersect"], serde_json::json!(true));
        assert_eq!(
            fields["query"],
            serde_json::json!({ "listed": true, "tags": ["code", "music"] })
        );
    }

    #[test]
    fn test_unknown_request_tag() {
        let bytes = encode_envelope("Delete", Some(&"x")).unwrap();
        let result = Request::decode(Bytes::from(bytes));
        assert!(matches!(result, Err(ClientError::UnrecognizedTag(tag)) if tag == "Delete"));
    }

    #[test]
    fn test_request_without_value() {
        let bytes = encode_envelope::<()>("CollateGet", None).unwrap();
        let result = Request::decode(Bytes::from(bytes));
        assert!(matches!(result, Err(ClientError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_missing_optional_fields_take_defaults() {
        #[derive(Serialize)]
        struct Minimal {
            name: &'static str,
        }
        let bytes = encode_envelope("SingleGet", Some(&Minimal { name: "a.md" })).unwrap();
        let Request::SingleGet(req) = Request::decode(Bytes::from(bytes)).unwrap() else {
            panic!("expected SingleGet");
        };
        assert_eq!(req.name, "a.md");
        assert!(req.sort_key.is_empty());
        assert!(!req.order_desc);
    }
}
