//! Paginated listing of document summaries.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::{decode_required, Operation};
use crate::document::Summary;
use crate::error::Result;
use crate::query::{FieldMap, Query};

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// List summaries of all documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListGet {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sort_key: String,
    #[serde(default)]
    pub order_desc: bool,
    /// Index of the first entry in the ordered match set.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub offset: usize,
    /// Maximum number of entries; `None` means no bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ListGet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = sort_key.into();
        self
    }

    pub fn order_desc(mut self, order_desc: bool) -> Self {
        self.order_desc = order_desc;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// List only documents matching `query`.
    pub fn with_query(self, query: Query) -> ListQuery {
        ListQuery {
            query,
            sort_key: self.sort_key,
            order_desc: self.order_desc,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

/// List summaries of documents matching a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ListQueryWire", into = "ListQueryWire")]
pub struct ListQuery {
    pub query: Query,
    pub sort_key: String,
    pub order_desc: bool,
    pub offset: usize,
    pub limit: Option<usize>,
}

#[derive(Serialize, Deserialize)]
struct ListQueryWire {
    #[serde(default)]
    query: FieldMap,
    #[serde(default)]
    intersect: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    sort_key: String,
    #[serde(default)]
    order_desc: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
}

impl From<ListQueryWire> for ListQuery {
    fn from(wire: ListQueryWire) -> Self {
        Self {
            query: Query {
                map: wire.query,
                intersect: wire.intersect,
            },
            sort_key: wire.sort_key,
            order_desc: wire.order_desc,
            offset: wire.offset,
            limit: wire.limit,
        }
    }
}

impl From<ListQuery> for ListQueryWire {
    fn from(req: ListQuery) -> Self {
        Self {
            query: req.query.map,
            intersect: req.query.intersect,
            sort_key: req.sort_key,
            order_desc: req.order_desc,
            offset: req.offset,
            limit: req.limit,
        }
    }
}

/// A window of the ordered match set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    #[serde(default)]
    pub files: Vec<Summary>,
    /// Size of the whole match set, before windowing.
    pub total: usize,
}

impl Operation for ListGet {
    const TAG: &'static str = "ListGet";
    type Output = ListResult;

    fn decode_output(value: Option<Bytes>) -> Result<Self::Output> {
        decode_required(Self::TAG, value)
    }
}

impl Operation for ListQuery {
    const TAG: &'static str = "ListQuery";
    type Output = ListResult;

    fn decode_output(value: Option<Bytes>) -> Result<Self::Output> {
        decode_required(Self::TAG, value)
    }
}
