//! # custard-client
//!
//! Rust client for the custard document protocol.
//!
//! A custard server holds a collection of text documents (front-matter,
//! body, timestamps) and answers three kinds of request over a local Unix
//! socket: fetch a single document with its neighbors, list a window of
//! summaries, or collate the distinct values of a front-matter field. Each
//! kind comes in a `Get` form over all documents and a `Query` form over a
//! filtered subset.
//!
//! ## Architecture
//!
//! - **Frame Codec** ([`protocol`]): length-prefixed or self-delimiting msgpack frames
//! - **Envelope Codec** ([`codec`]): `{tag, value}` with two-phase decoding
//! - **Operations** ([`operation`]): the six request shapes, one generic [`Client::call`]
//! - **Reference server** ([`server`], [`store`]): evaluates requests against in-memory documents
//!
//! Every call opens a fresh connection, sends one request, reads one
//! response and closes. Nothing is retried or pooled.
//!
//! ## Example
//!
//! ```ignore
//! use custard_client::{Client, Query};
//!
//! #[tokio::main]
//! async fn main() -> custard_client::Result<()> {
//!     let client = Client::new("/tmp/custard.sock");
//!
//!     let tags = client.get_collate("tags").await?;
//!     let code = Query::builder().field("tags", ["code"]).build()?;
//!     let page = client.query_list(code, "", true, 0, Some(3)).await?;
//!
//!     println!("{tags:?}: {} of {}", page.files.len(), page.total);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod document;
pub mod error;
pub mod operation;
pub mod protocol;
pub mod query;
pub mod server;
pub mod store;
pub mod transport;

mod client;

pub use client::{Client, ClientBuilder, ClientConfig};
pub use document::{Document, FieldValue, Frontmatter, Scalar, Summary};
pub use error::{ClientError, ErrorClass, Result};
pub use operation::{
    CollateGet, CollateQuery, ListGet, ListQuery, ListResult, Operation, SingleGet, SingleQuery,
    SingleResult,
};
pub use protocol::Framing;
pub use query::{Query, QueryBuilder};
