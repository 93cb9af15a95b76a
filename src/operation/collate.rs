//! Distinct values of one front-matter field.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::{decode_required, Operation};
use crate::error::Result;
use crate::query::{FieldMap, Query};

/// Collate `key` across all documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollateGet {
    pub key: String,
}

impl CollateGet {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Collate only over documents matching `query`.
    pub fn with_query(self, query: Query) -> CollateQuery {
        CollateQuery {
            key: self.key,
            query,
        }
    }
}

/// Collate `key` across documents matching a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "CollateQueryWire", into = "CollateQueryWire")]
pub struct CollateQuery {
    pub key: String,
    pub query: Query,
}

#[derive(Serialize, Deserialize)]
struct CollateQueryWire {
    key: String,
    #[serde(default)]
    query: FieldMap,
    #[serde(default)]
    intersect: bool,
}

impl From<CollateQueryWire> for CollateQuery {
    fn from(wire: CollateQueryWire) -> Self {
        Self {
            key: wire.key,
            query: Query {
                map: wire.query,
                intersect: wire.intersect,
            },
        }
    }
}

impl From<CollateQuery> for CollateQueryWire {
    fn from(req: CollateQuery) -> Self {
        Self {
            key: req.key,
            query: req.query.map,
            intersect: req.query.intersect,
        }
    }
}

impl Operation for CollateGet {
    const TAG: &'static str = "CollateGet";
    type Output = Vec<String>;

    fn decode_output(value: Option<Bytes>) -> Result<Self::Output> {
        decode_required(Self::TAG, value)
    }
}

impl Operation for CollateQuery {
    const TAG: &'static str = "CollateQuery";
    type Output = Vec<String>;

    fn decode_output(value: Option<Bytes>) -> Result<Self::Output> {
        decode_required(Self::TAG, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MsgPackCodec;

    #[test]
    fn test_decode_values() {
        let bytes = MsgPackCodec::encode(&["code", "sketch"]).unwrap();
        let values = CollateQuery::decode_output(Some(Bytes::from(bytes))).unwrap();
        assert_eq!(values, ["code", "sketch"]);
    }

    #[test]
    fn test_decode_wrong_shape() {
        let bytes = MsgPackCodec::encode(&42u32).unwrap();
        assert!(CollateGet::decode_output(Some(Bytes::from(bytes))).is_err());
    }

    #[test]
    fn test_wire_keys() {
        let query = Query::builder().field("tags", ["code"]).intersect(true).build().unwrap();
        let json = serde_json::to_value(CollateGet::new("tags").with_query(query)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "key": "tags", "query": { "tags": "code" }, "intersect": true })
        );
    }
}
