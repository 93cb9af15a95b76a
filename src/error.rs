//! Error types for custard-client.

use std::time::Duration;

use thiserror::Error;

/// Coarse classification of a [`ClientError`].
///
/// Lets callers branch on the failure taxonomy without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Connectivity: connect, read, write, truncated frame, timeout.
    Transport,
    /// The request could not be put on the wire. Raised before any I/O.
    Encoding,
    /// The response bytes were not a valid envelope or value.
    Decoding,
    /// The peer answered with a tag this client does not know.
    Protocol,
    /// The server reported an opaque internal failure.
    Server,
    /// The caller built an invalid request.
    Usage,
}

/// Main error type for all custard operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not connect to the socket.
    #[error("Failed to connect to {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while writing or reading the socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream closed before a complete frame arrived.
    #[error("Truncated frame: expected {expected} bytes, received {received}")]
    TruncatedFrame { expected: usize, received: usize },

    /// The call did not complete within the configured deadline.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Payload does not fit in the frame length header.
    #[error("Payload size {size} exceeds maximum {max}")]
    OversizedPayload { size: usize, max: usize },

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// Envelope was not a `{tag, value}` map.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Response tag is neither `Ok` nor `InternalServerError`.
    #[error("Unrecognised tag from server: {0}")]
    UnrecognizedTag(String),

    /// The server answered `InternalServerError`.
    #[error("Server had an internal error")]
    InternalServerError,

    /// Query construction rejected the input.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl ClientError {
    /// Which part of the taxonomy this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            ClientError::Connect { .. }
            | ClientError::Io(_)
            | ClientError::TruncatedFrame { .. }
            | ClientError::Timeout(_) => ErrorClass::Transport,
            ClientError::OversizedPayload { .. } | ClientError::MsgPackEncode(_) => {
                ErrorClass::Encoding
            }
            ClientError::MsgPackDecode(_) | ClientError::MalformedEnvelope(_) => {
                ErrorClass::Decoding
            }
            ClientError::UnrecognizedTag(_) => ErrorClass::Protocol,
            ClientError::InternalServerError => ErrorClass::Server,
            ClientError::InvalidQuery(_) => ErrorClass::Usage,
        }
    }

    /// True for connectivity failures.
    #[inline]
    pub fn is_transport(&self) -> bool {
        self.class() == ErrorClass::Transport
    }
}

/// Result type alias using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;
