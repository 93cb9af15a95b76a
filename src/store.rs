//! In-memory document set and the evaluation of the three operation kinds.
//!
//! Ordering rules:
//! - empty `sort_key`: ascending `created`
//! - otherwise: the rendered front-matter value of `sort_key`, falling back
//!   to `created` for documents that lack the field
//! - ties break by `name`, so the order is total
//! - `order_desc` reverses the whole order, tie-break included
//!
//! Neighbors (Single) and windows (List) are taken from that order. Collate
//! ignores it.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::document::{Document, FieldValue, Summary};
use crate::operation::{ListResult, SingleResult};
use crate::query::Query;

/// Read-only snapshot of documents keyed by name.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: BTreeMap<String, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document, returning the previous one.
    pub fn insert(&mut self, document: Document) -> Option<Document> {
        self.documents.insert(document.name.clone(), document)
    }

    pub fn remove(&mut self, name: &str) -> Option<Document> {
        self.documents.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Document> {
        self.documents.get(name)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Documents matching `query`, unordered. `None` matches everything.
    pub fn match_set(&self, query: Option<&Query>) -> Vec<&Document> {
        self.iter()
            .filter(|doc| query.map_or(true, |q| q.matches(doc)))
            .collect()
    }

    /// The ordered match set.
    pub fn ordered(&self, query: Option<&Query>, sort_key: &str, order_desc: bool) -> Vec<&Document> {
        let mut docs = self.match_set(query);
        sort_documents(&mut docs, sort_key, order_desc);
        docs
    }

    /// Locate `name` in the ordered match set, with its neighbors.
    ///
    /// `None` when the document does not exist or is filtered out.
    pub fn single(
        &self,
        name: &str,
        query: Option<&Query>,
        sort_key: &str,
        order_desc: bool,
    ) -> Option<SingleResult> {
        let docs = self.ordered(query, sort_key, order_desc);
        let index = docs.iter().position(|doc| doc.name == name)?;

        let prev_file_name = index
            .checked_sub(1)
            .map(|i| docs[i].name.clone())
            .unwrap_or_default();
        let next_file_name = docs
            .get(index + 1)
            .map(|doc| doc.name.clone())
            .unwrap_or_default();

        Some(SingleResult {
            file: docs[index].clone(),
            prev_file_name,
            next_file_name,
        })
    }

    /// A window `[offset, offset + limit)` of the ordered match set.
    ///
    /// The window is clamped to the set; `total` is always the full size.
    pub fn list(
        &self,
        query: Option<&Query>,
        sort_key: &str,
        order_desc: bool,
        offset: usize,
        limit: Option<usize>,
    ) -> ListResult {
        let docs = self.ordered(query, sort_key, order_desc);
        let total = docs.len();

        let files = docs
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .map(Summary::from)
            .collect();

        ListResult { files, total }
    }

    /// Distinct string values of `key` over the match set, ascending.
    pub fn collate(&self, key: &str, query: Option<&Query>) -> Vec<String> {
        let mut values: Vec<String> = self
            .match_set(query)
            .into_iter()
            .flat_map(|doc| doc.field_values(key))
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect();

        values.sort();
        values.dedup();
        values
    }
}

impl FromIterator<Document> for DocumentStore {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut store = Self::new();
        for document in iter {
            store.insert(document);
        }
        store
    }
}

fn sort_documents(docs: &mut [&Document], sort_key: &str, order_desc: bool) {
    docs.sort_by(|a, b| {
        let ordering = compare(a, b, sort_key);
        if order_desc {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn compare(a: &Document, b: &Document, sort_key: &str) -> Ordering {
    sort_value(a, sort_key)
        .cmp(&sort_value(b, sort_key))
        .then_with(|| a.name.cmp(&b.name))
}

fn sort_value<'a>(doc: &'a Document, sort_key: &str) -> Cow<'a, str> {
    if sort_key.is_empty() {
        return Cow::Borrowed(&doc.created);
    }
    match doc.field(sort_key) {
        Some(FieldValue::One(value)) => match value.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(value.to_string()),
        },
        Some(FieldValue::Many(values)) => Cow::Owned(
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        None => Cow::Borrowed(&doc.created),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_store() -> DocumentStore {
        [
            Document::new("something.md", "", "2024-01-01T05:00:00Z", "2024-01-01T06:00:00Z"),
            Document::new("about.md", "", "2024-01-01T09:00:00Z", "2024-01-01T11:00:00Z")
                .with_field("tag", "blue")
                .with_field("title", "Zebra"),
            Document::new("blah.md", "", "2024-01-01T15:00:00Z", "2024-01-01T16:00:00Z")
                .with_field("tag", "blue")
                .with_field("title", "Apple"),
        ]
        .into_iter()
        .collect()
    }

    fn names(docs: &[&Document]) -> Vec<String> {
        docs.iter().map(|d| d.name.clone()).collect()
    }

    fn blue() -> Query {
        Query::builder().field("tag", ["blue"]).build().unwrap()
    }

    #[test]
    fn test_default_order_is_created() {
        let store = make_test_store();
        assert_eq!(
            names(&store.ordered(None, "", false)),
            ["something.md", "about.md", "blah.md"]
        );
        assert_eq!(
            names(&store.ordered(None, "", true)),
            ["blah.md", "about.md", "something.md"]
        );
    }

    #[test]
    fn test_sort_key_falls_back_to_created() {
        let store = make_test_store();
        // "2024-..." sorts before "Apple" and "Zebra".
        assert_eq!(
            names(&store.ordered(None, "title", false)),
            ["something.md", "blah.md", "about.md"]
        );
    }

    #[test]
    fn test_ties_break_by_name() {
        let store: DocumentStore = ["c.md", "a.md", "b.md"]
            .into_iter()
            .map(|name| Document::new(name, "", "2024-01-01T00:00:00Z", "2024-01-01T00:00:00Z"))
            .collect();
        assert_eq!(names(&store.ordered(None, "", false)), ["a.md", "b.md", "c.md"]);
        assert_eq!(names(&store.ordered(None, "", true)), ["c.md", "b.md", "a.md"]);
    }

    #[test]
    fn test_single_get_neighbors() {
        let store = make_test_store();

        let response = store.single("something.md", None, "created", true).unwrap();
        assert_eq!(response.prev(), Some("about.md"));
        assert_eq!(response.next(), None);

        let response = store.single("about.md", None, "created", true).unwrap();
        assert_eq!(response.prev(), Some("blah.md"));
        assert_eq!(response.next(), Some("something.md"));

        let response = store.single("blah.md", None, "created", true).unwrap();
        assert_eq!(response.prev(), None);
        assert_eq!(response.next(), Some("about.md"));
    }

    #[test]
    fn test_single_query_neighbors_within_match_set() {
        let store = make_test_store();
        let query = blue();

        let response = store.single("about.md", Some(&query), "", false).unwrap();
        assert_eq!(response.prev(), None);
        assert_eq!(response.next(), Some("blah.md"));

        let response = store.single("blah.md", Some(&query), "", false).unwrap();
        assert_eq!(response.prev(), Some("about.md"));
        assert_eq!(response.next(), None);
    }

    #[test]
    fn test_single_filtered_out_is_not_found() {
        let store = make_test_store();
        assert!(store.single("something.md", Some(&blue()), "", false).is_none());
        assert!(store.single("missing.md", None, "", false).is_none());
    }

    #[test]
    fn test_neighbor_symmetry() {
        let store = make_test_store();
        for desc in [false, true] {
            let ordered = store.ordered(None, "title", desc);
            for pair in ordered.windows(2) {
                let (p, d) = (pair[0], pair[1]);
                let at_d = store.single(&d.name, None, "title", desc).unwrap();
                let at_p = store.single(&p.name, None, "title", desc).unwrap();
                assert_eq!(at_d.prev_file_name, p.name);
                assert_eq!(at_p.next_file_name, d.name);
            }
        }
    }

    #[test]
    fn test_list_window_and_total() {
        let store = make_test_store();

        let result = store.list(None, "", false, 1, Some(1));
        assert_eq!(result.total, 3);
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].name, "about.md");

        let result = store.list(None, "", false, 2, Some(10));
        assert_eq!(result.files.len(), 1);

        let result = store.list(None, "", false, 0, None);
        assert_eq!(result.files.len(), 3);
    }

    #[test]
    fn test_list_offset_past_end() {
        let store = make_test_store();
        for offset in [3, 4, usize::MAX] {
            let result = store.list(Some(&blue()), "", false, offset, Some(2));
            assert!(result.files.is_empty());
            assert_eq!(result.total, 2);
        }
    }

    #[test]
    fn test_collate_dedups_and_sorts() {
        let store: DocumentStore = [
            Document::new("1.md", "", "t1", "t1").with_field("tags", vec!["travel", "code"]),
            Document::new("2.md", "", "t2", "t2").with_field("tags", vec!["code", "music"]),
            Document::new("3.md", "", "t3", "t3").with_field("tags", "ramble"),
            Document::new("4.md", "", "t4", "t4"),
            Document::new("5.md", "", "t5", "t5").with_field("tags", crate::document::Scalar::Integer(7)),
        ]
        .into_iter()
        .collect();

        assert_eq!(store.collate("tags", None), ["code", "music", "ramble", "travel"]);

        let code = Query::builder().field("tags", ["code"]).build().unwrap();
        assert_eq!(store.collate("tags", Some(&code)), ["code", "music", "travel"]);
        assert!(store.collate("missing", None).is_empty());
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let mut store = make_test_store();
        let old = store.insert(Document::new("about.md", "new body", "t", "t"));
        assert!(old.is_some());
        assert_eq!(store.len(), 3);
        assert_eq!(store.get("about.md").unwrap().body, "new body");
        assert!(store.remove("about.md").is_some());
        assert_eq!(store.len(), 2);
    }
}
