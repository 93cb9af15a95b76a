//! Front-matter filter shared by all `*Query` operations.
//!
//! A [`Query`] maps field names to accepted values. A field matches a
//! document when at least one of the document's values for it is accepted.
//! `intersect` decides how field results combine: every field must match
//! (AND) or any field may (OR). Within a field the test is always OR.
//!
//! Fields live in a `BTreeMap` and accepted values are kept sorted, so
//! insertion order never affects encoding or matching.
//!
//! On the wire a query is not a value of its own: requests carry the field
//! map as `query` and the combinator as a sibling `intersect` field.
//!
//! # Example
//!
//! ```
//! use custard_client::document::Document;
//! use custard_client::query::Query;
//!
//! let query = Query::builder()
//!     .field("tags", ["code", "sketch"])
//!     .field("listed", [true])
//!     .intersect(true)
//!     .build()
//!     .unwrap();
//!
//! let doc = Document::new("a.md", "", "2024-01-01T00:00:00Z", "2024-01-01T00:00:00Z")
//!     .with_field("tags", vec!["code"])
//!     .with_field("listed", custard_client::document::Scalar::Bool(true));
//! assert!(query.matches(&doc));
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::document::{Document, FieldValue, Scalar};
use crate::error::{ClientError, Result};

/// Field name → accepted values, as sent in a request's `query` field.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Field filter with an AND/OR combinator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Field name → accepted values.
    pub map: FieldMap,
    /// `true`: all fields must match. `false`: any field may.
    pub intersect: bool,
}

impl Query {
    /// Start building a query.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// A query that matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// True when the query has no fields.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Whether `document` is in this query's match set.
    pub fn matches(&self, document: &Document) -> bool {
        if self.map.is_empty() {
            return true;
        }

        let mut fields = self
            .map
            .iter()
            .map(|(key, accepted)| field_matches(accepted.values(), document.field_values(key)));

        if self.intersect {
            fields.all(|hit| hit)
        } else {
            fields.any(|hit| hit)
        }
    }
}

fn field_matches(accepted: &[Scalar], values: &[Scalar]) -> bool {
    values.iter().any(|value| accepted.contains(value))
}

/// Builder for [`Query`].
#[derive(Debug, Default)]
pub struct QueryBuilder {
    map: BTreeMap<String, Vec<Scalar>>,
    intersect: bool,
}

impl QueryBuilder {
    /// Accept `values` for field `key`.
    ///
    /// Calling it again for the same key adds to that key's accepted set.
    pub fn field<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        self.map
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// AND (`true`) or OR (`false`, default) across fields.
    pub fn intersect(mut self, intersect: bool) -> Self {
        self.intersect = intersect;
        self
    }

    /// Finish the query.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuery` if a field has no accepted values.
    pub fn build(self) -> Result<Query> {
        let mut map = BTreeMap::new();
        for (key, mut values) in self.map {
            if values.is_empty() {
                return Err(ClientError::InvalidQuery(format!(
                    "field `{key}` has no accepted values"
                )));
            }
            values.sort_by(canonical_order);
            values.dedup();
            let value = if values.len() == 1 {
                FieldValue::One(values.remove(0))
            } else {
                FieldValue::Many(values)
            };
            map.insert(key, value);
        }

        Ok(Query {
            map,
            intersect: self.intersect,
        })
    }
}

/// Total order over scalars: by kind, then by value.
fn canonical_order(a: &Scalar, b: &Scalar) -> Ordering {
    fn rank(scalar: &Scalar) -> u8 {
        match scalar {
            Scalar::Null => 0,
            Scalar::Bool(_) => 1,
            Scalar::Integer(_) => 2,
            Scalar::Float(_) => 3,
            Scalar::String(_) => 4,
        }
    }

    match (a, b) {
        (Scalar::Bool(x), Scalar::Bool(y)) => x.cmp(y),
        (Scalar::Integer(x), Scalar::Integer(y)) => x.cmp(y),
        (Scalar::Float(x), Scalar::Float(y)) => x.total_cmp(y),
        (Scalar::String(x), Scalar::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
