//! Reference server answering the six request tags from a [`DocumentStore`].
//!
//! The [`ServerBuilder`] mirrors the client's configuration. The [`Server`]
//! lifecycle:
//! 1. Bind the Unix socket
//! 2. Accept connections, one task each
//! 3. Read request frames until the peer closes
//! 4. Evaluate each request and write one response frame
//!
//! Requests that cannot be decoded or answered get an `InternalServerError`
//! reply; the details are logged here and never sent to the client.
//!
//! # Example
//!
//! ```ignore
//! use custard_client::server::Server;
//! use custard_client::store::DocumentStore;
//!
//! let store: DocumentStore = load_documents().into_iter().collect();
//! let server = Server::builder("/tmp/custard.sock").bind(store)?;
//! server.run().await?;
//! ```

use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UnixStream;
use tokio::task::JoinHandle;

use crate::codec::Response;
use crate::error::Result;
use crate::operation::Request;
use crate::protocol::{FrameCodec, Framing, DEFAULT_MAX_PAYLOAD_SIZE};
use crate::store::DocumentStore;
use crate::transport::SocketListener;

/// Builder for configuring and binding a [`Server`].
pub struct ServerBuilder {
    socket_path: String,
    framing: Framing,
    max_payload_size: u32,
}

impl ServerBuilder {
    /// Create a new server builder for the socket at `socket_path`.
    pub fn new(socket_path: impl Into<String>) -> Self {
        Self {
            socket_path: socket_path.into(),
            framing: Framing::default(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }

    /// Set the framing strategy.
    ///
    /// Default: length-prefixed.
    pub fn framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Set the maximum payload size for requests and responses.
    ///
    /// Default: 64 MiB
    pub fn max_payload_size(mut self, max: u32) -> Self {
        self.max_payload_size = max;
        self
    }

    /// Bind the socket and attach `store`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(self, store: impl Into<Arc<DocumentStore>>) -> Result<Server> {
        let listener = SocketListener::bind(&self.socket_path)?;
        tracing::info!(path = %self.socket_path, framing = ?self.framing, "listening");

        Ok(Server {
            listener,
            codec: FrameCodec::with_max_payload(self.framing, self.max_payload_size),
            store: store.into(),
        })
    }
}

/// A bound server. Dropping it removes the socket file.
pub struct Server {
    listener: SocketListener,
    codec: FrameCodec,
    store: Arc<DocumentStore>,
}

impl Server {
    /// Create a new server builder.
    pub fn builder(socket_path: impl Into<String>) -> ServerBuilder {
        ServerBuilder::new(socket_path)
    }

    pub fn path(&self) -> &str {
        self.listener.path()
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Accept connections forever, one task per connection.
    ///
    /// # Errors
    ///
    /// Returns only if accepting fails.
    pub async fn run(self) -> Result<()> {
        loop {
            let stream = self.listener.accept().await?;
            tracing::debug!("accepted connection");

            let codec = self.codec;
            let store = self.store.clone();
            tokio::spawn(async move {
                if let Err(e) = serve_connection(stream, codec, store).await {
                    tracing::error!("connection error: {}", e);
                }
            });
        }
    }

    /// Run the accept loop on a background task.
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }
}

/// Answer requests on one connection until the peer closes it.
async fn serve_connection(
    mut stream: UnixStream,
    codec: FrameCodec,
    store: Arc<DocumentStore>,
) -> Result<()> {
    let mut buffer = codec.buffer();

    while let Some(frame) = codec.read_frame(&mut stream, &mut buffer).await? {
        let reply = respond(&store, frame);
        if let Err(e) = codec.write_frame(&mut stream, &reply).await {
            tracing::error!("failed to write response: {}", e);
            return Err(e);
        }
    }

    tracing::debug!("connection closed");
    Ok(())
}

/// Encoded response envelope for one request frame.
fn respond(store: &DocumentStore, frame: Bytes) -> Vec<u8> {
    let request = match Request::decode(frame) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("undecodable request: {}", e);
            return Response::internal_server_error_bytes().to_vec();
        }
    };

    tracing::debug!(tag = request.tag(), "handling request");

    match evaluate(store, &request) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(tag = request.tag(), "failed to encode response: {}", e);
            Response::internal_server_error_bytes().to_vec()
        }
    }
}

/// Run `request` against `store` and encode the `Ok` envelope.
pub fn evaluate(store: &DocumentStore, request: &Request) -> Result<Vec<u8>> {
    match request {
        Request::SingleGet(req) => {
            let result = store.single(&req.name, None, &req.sort_key, req.order_desc);
            Response::encode_ok(result.as_ref())
        }
        Request::SingleQuery(req) => {
            let result = store.single(&req.name, Some(&req.query), &req.sort_key, req.order_desc);
            Response::encode_ok(result.as_ref())
        }
        Request::ListGet(req) => {
            let result = store.list(None, &req.sort_key, req.order_desc, req.offset, req.limit);
            Response::encode_ok(Some(&result))
        }
        Request::ListQuery(req) => {
            let result = store.list(
                Some(&req.query),
                &req.sort_key,
                req.order_desc,
                req.offset,
                req.limit,
            );
            Response::encode_ok(Some(&result))
        }
        Request::CollateGet(req) => Response::encode_ok(Some(&store.collate(&req.key, None))),
        Request::CollateQuery(req) => {
            Response::encode_ok(Some(&store.collate(&req.key, Some(&req.query))))
        }
    }
}
