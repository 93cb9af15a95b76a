//! Documents as they travel over the socket.
//!
//! A document is a named text note with optional front-matter. Front-matter
//! maps field names to one scalar or a list of scalars. Timestamps are
//! strings in a fixed, lexically sortable format (RFC 3339, UTC, `Z`
//! suffix), so comparing them as strings orders them in time.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A front-matter leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

impl Scalar {
    /// The string content, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::String(s) => f.write_str(s),
            Scalar::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Integer(i)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// One scalar or a list of scalars.
///
/// Query accepted-value sets use the same shape on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Many(Vec<Scalar>),
    One(Scalar),
}

impl FieldValue {
    /// All scalars, a single value being a one-element slice.
    pub fn values(&self) -> &[Scalar] {
        match self {
            FieldValue::Many(values) => values,
            FieldValue::One(value) => std::slice::from_ref(value),
        }
    }
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        FieldValue::One(value)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::One(s.into())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::One(s.into())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::One(b.into())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::One(i.into())
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::Many(values.into_iter().map(Into::into).collect())
    }
}

/// Structured metadata of a document.
pub type Frontmatter = BTreeMap<String, FieldValue>;

/// A complete document snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique, stable key.
    pub name: String,
    /// `None` for documents without structured fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<Frontmatter>,
    pub body: String,
    pub modified: String,
    pub created: String,
}

impl Document {
    /// Create a document without front-matter.
    pub fn new(
        name: impl Into<String>,
        body: impl Into<String>,
        created: impl Into<String>,
        modified: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            frontmatter: None,
            body: body.into(),
            modified: modified.into(),
            created: created.into(),
        }
    }

    /// Set one front-matter field, creating the front-matter if needed.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.frontmatter
            .get_or_insert_with(Frontmatter::new)
            .insert(key.into(), value.into());
        self
    }

    /// The value of a front-matter field.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.frontmatter.as_ref()?.get(key)
    }

    /// The scalars of a front-matter field; empty when missing.
    pub fn field_values(&self, key: &str) -> &[Scalar] {
        self.field(key).map(FieldValue::values).unwrap_or(&[])
    }

    /// First non-blank line of the body, trimmed.
    pub fn one_liner(&self) -> Option<String> {
        self.body
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    }
}

/// A list entry: a document without its body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<Frontmatter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_liner: Option<String>,
    pub modified: String,
    pub created: String,
}

impl From<&Document> for Summary {
    fn from(doc: &Document) -> Self {
        Self {
            name: doc.name.clone(),
            frontmatter: doc.frontmatter.clone(),
            one_liner: doc.one_liner(),
            modified: doc.modified.clone(),
            created: doc.created.clone(),
        }
    }
}
