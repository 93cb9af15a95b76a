//! Single-document lookup with neighbors.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::Operation;
use crate::codec::MsgPackCodec;
use crate::document::Document;
use crate::error::Result;
use crate::query::{FieldMap, Query};

/// Fetch one document by exact name from the whole set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SingleGet {
    pub name: String,
    /// Ordering used for neighbors. Empty means default ordering.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sort_key: String,
    #[serde(default)]
    pub order_desc: bool,
}

impl SingleGet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = sort_key.into();
        self
    }

    pub fn order_desc(mut self, order_desc: bool) -> Self {
        self.order_desc = order_desc;
        self
    }

    /// Restrict the lookup and its neighbors to `query`'s match set.
    pub fn with_query(self, query: Query) -> SingleQuery {
        SingleQuery {
            name: self.name,
            query,
            sort_key: self.sort_key,
            order_desc: self.order_desc,
        }
    }
}

/// Fetch one document by name within a query's match set.
///
/// A document outside the match set is "not found", even if it exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SingleQueryWire", into = "SingleQueryWire")]
pub struct SingleQuery {
    pub name: String,
    pub query: Query,
    pub sort_key: String,
    pub order_desc: bool,
}

#[derive(Serialize, Deserialize)]
struct SingleQueryWire {
    name: String,
    #[serde(default)]
    query: FieldMap,
    #[serde(default)]
    intersect: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    sort_key: String,
    #[serde(default)]
    order_desc: bool,
}

impl From<SingleQueryWire> for SingleQuery {
    fn from(wire: SingleQueryWire) -> Self {
        Self {
            name: wire.name,
            query: Query {
                map: wire.query,
                intersect: wire.intersect,
            },
            sort_key: wire.sort_key,
            order_desc: wire.order_desc,
        }
    }
}

impl From<SingleQuery> for SingleQueryWire {
    fn from(req: SingleQuery) -> Self {
        Self {
            name: req.name,
            query: req.query.map,
            intersect: req.query.intersect,
            sort_key: req.sort_key,
            order_desc: req.order_desc,
        }
    }
}

/// A document and the names of its neighbors in the ordered match set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleResult {
    pub file: Document,
    /// Empty when the document is first.
    #[serde(default)]
    pub prev_file_name: String,
    /// Empty when the document is last.
    #[serde(default)]
    pub next_file_name: String,
}

impl SingleResult {
    pub fn prev(&self) -> Option<&str> {
        Some(self.prev_file_name.as_str()).filter(|name| !name.is_empty())
    }

    pub fn next(&self) -> Option<&str> {
        Some(self.next_file_name.as_str()).filter(|name| !name.is_empty())
    }
}

fn decode_single(value: Option<Bytes>) -> Result<Option<SingleResult>> {
    value.map(|bytes| MsgPackCodec::decode(&bytes)).transpose()
}

impl Operation for SingleGet {
    const TAG: &'static str = "SingleGet";
    type Output = Option<SingleResult>;

    fn decode_output(value: Option<Bytes>) -> Result<Self::Output> {
        decode_single(value)
    }
}

impl Operation for SingleQuery {
    const TAG: &'static str = "SingleQuery";
    type Output = Option<SingleResult>;

    fn decode_output(value: Option<Bytes>) -> Result<Self::Output> {
        decode_single(value)
    }
}
