//! Client builder and call path.
//!
//! The [`ClientBuilder`] provides a fluent API for configuring the socket
//! path, framing and limits. The [`Client`] runs one exchange per call:
//! 1. Encode the request envelope and frame it (no I/O yet)
//! 2. Connect to the socket
//! 3. Write the frame
//! 4. Read exactly one response frame
//! 5. Close the connection and decode the response
//!
//! # Example
//!
//! ```ignore
//! use custard_client::{Client, Query};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder("/tmp/custard.sock")
//!         .timeout(std::time::Duration::from_secs(2))
//!         .build();
//!
//!     let code = Query::builder().field("tags", ["code"]).build()?;
//!     let page = client.query_list(code, "title", false, 0, Some(10)).await?;
//!     println!("{} of {}", page.files.len(), page.total);
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;

use crate::codec::Response;
use crate::error::{ClientError, Result};
use crate::operation::{CollateGet, ListGet, ListResult, Operation, SingleGet, SingleResult};
use crate::protocol::{FrameCodec, Framing, DEFAULT_MAX_PAYLOAD_SIZE, LENGTH_PREFIX_SIZE};
use crate::query::Query;
use crate::transport::connect;

/// Connection settings shared by every call of a [`Client`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Path of the server's Unix socket.
    pub socket_path: String,
    /// How messages are delimited on the wire.
    pub framing: Framing,
    /// Largest payload accepted in either direction.
    pub max_payload_size: u32,
    /// Deadline for a whole call, connect included. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(socket_path: impl Into<String>) -> Self {
        Self {
            socket_path: socket_path.into(),
            framing: Framing::default(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            timeout: None,
        }
    }
}

/// Builder for configuring and creating a [`Client`].
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Create a new client builder for the socket at `socket_path`.
    pub fn new(socket_path: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(socket_path),
        }
    }

    /// Set the framing strategy.
    ///
    /// Must match the server's. Default: length-prefixed.
    pub fn framing(mut self, framing: Framing) -> Self {
        self.config.framing = framing;
        self
    }

    /// Set the maximum payload size for requests and responses.
    ///
    /// Default: 64 MiB
    pub fn max_payload_size(mut self, max: u32) -> Self {
        self.config.max_payload_size = max;
        self
    }

    /// Set a deadline covering connect, write and read of each call.
    ///
    /// Default: none
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Client {
        Client::with_config(self.config)
    }
}

/// Handle for issuing requests to a custard server.
///
/// Holds configuration only; each call opens and closes its own connection,
/// so a `Client` can be cloned and shared across tasks freely.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    codec: FrameCodec,
}

impl Client {
    /// Client with default settings for the socket at `socket_path`.
    pub fn new(socket_path: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::new(socket_path))
    }

    /// Create a new client builder.
    pub fn builder(socket_path: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(socket_path)
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let codec = FrameCodec::with_max_payload(config.framing, config.max_payload_size);
        Self { config, codec }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send `operation` and wait for its result.
    ///
    /// # Errors
    ///
    /// Encoding failures are returned before any connection is opened.
    /// Afterwards any transport, decoding or protocol failure is returned
    /// as is, and an `InternalServerError` reply becomes
    /// [`ClientError::InternalServerError`].
    pub async fn call<O: Operation>(&self, operation: &O) -> Result<O::Output> {
        let envelope = operation.encode_request()?;
        let frame = self.codec.encode(&envelope)?;

        tracing::debug!(
            tag = O::TAG,
            bytes = frame.len(),
            path = %self.config.socket_path,
            "sending request"
        );

        let reply = self.with_deadline(self.exchange(&frame)).await?;

        tracing::debug!(tag = O::TAG, bytes = reply.len(), "received response");

        let value = match Response::decode(reply) {
            Ok(Response::Ok(value)) => value,
            Ok(Response::InternalServerError) => {
                tracing::warn!(request = O::TAG, "server reported an internal error");
                return Err(ClientError::InternalServerError);
            }
            Err(ClientError::UnrecognizedTag(tag)) => {
                tracing::warn!(request = O::TAG, %tag, "unrecognised response tag");
                return Err(ClientError::UnrecognizedTag(tag));
            }
            Err(e) => return Err(e),
        };

        O::decode_output(value)
    }

    /// One round trip on a fresh connection. The stream is dropped on return.
    async fn exchange(&self, frame: &[u8]) -> Result<Bytes> {
        let mut stream = connect(&self.config.socket_path).await?;
        tracing::debug!(path = %self.config.socket_path, "connected");

        stream.write_all(frame).await?;
        stream.flush().await?;

        let mut buffer = self.codec.buffer();
        match self.codec.read_frame(&mut stream, &mut buffer).await? {
            Some(reply) => Ok(reply),
            None => Err(ClientError::TruncatedFrame {
                expected: match self.config.framing {
                    Framing::LengthPrefixed => LENGTH_PREFIX_SIZE,
                    Framing::SelfDelimiting => 1,
                },
                received: 0,
            }),
        }
    }

    async fn with_deadline<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| ClientError::Timeout(limit))?,
            None => fut.await,
        }
    }

    /// Fetch one document by name, with neighbors in the given order.
    pub async fn get_single(
        &self,
        name: &str,
        sort_key: &str,
        order_desc: bool,
    ) -> Result<Option<SingleResult>> {
        self.call(&SingleGet::new(name).sort_key(sort_key).order_desc(order_desc))
            .await
    }

    /// Fetch one document by name within `query`'s match set.
    pub async fn query_single(
        &self,
        query: Query,
        name: &str,
        sort_key: &str,
        order_desc: bool,
    ) -> Result<Option<SingleResult>> {
        let request = SingleGet::new(name)
            .sort_key(sort_key)
            .order_desc(order_desc)
            .with_query(query);
        self.call(&request).await
    }

    /// Fetch a window of summaries over all documents.
    pub async fn get_list(
        &self,
        sort_key: &str,
        order_desc: bool,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<ListResult> {
        self.call(&list_request(sort_key, order_desc, offset, limit))
            .await
    }

    /// Fetch a window of summaries over `query`'s match set.
    pub async fn query_list(
        &self,
        query: Query,
        sort_key: &str,
        order_desc: bool,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<ListResult> {
        self.call(&list_request(sort_key, order_desc, offset, limit).with_query(query))
            .await
    }

    /// Distinct values of `key` over all documents.
    pub async fn get_collate(&self, key: &str) -> Result<Vec<String>> {
        self.call(&CollateGet::new(key)).await
    }

    /// Distinct values of `key` over `query`'s match set.
    pub async fn query_collate(&self, query: Query, key: &str) -> Result<Vec<String>> {
        self.call(&CollateGet::new(key).with_query(query)).await
    }
}

fn list_request(sort_key: &str, order_desc: bool, offset: usize, limit: Option<usize>) -> ListGet {
    let request = ListGet::new()
        .sort_key(sort_key)
        .order_desc(order_desc)
        .offset(offset);
    match limit {
        Some(limit) => request.limit(limit),
        None => request,
    }
}
